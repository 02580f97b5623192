use std::io::{self, Read};
use std::path::Path;

use crate::{
    header::{
        DEFAULT_PERMISSIONS, EXTENDED_TIMESTAMP_LEN, FLAG_UTF8, LOCAL_HEADER_LEN,
        MAX_EXECUTABLE_LEN, METHOD_STORED, ZIP64_COUNT_SENTINEL,
    },
    path::entry_name,
    record::{to_dos, unix_mode, EntryRecord, Trailer},
    relocate::relocate,
    ser::{LocalHeader, Serialize},
    BuildError,
};

use super::BespokeImage;

/// Builds a bespoke binary: an executable followed by a ZIP archive whose
/// offsets are correct relative to the start of the executable.
///
/// The executable is held in memory along with every entry, since the
/// archive can only be relocated once its final layout is known.
#[derive(Debug)]
pub struct BespokeWriter {
    /// Executable followed by the archive segment written so far.
    pub(crate) buf: Vec<u8>,
    pub(crate) executable_len: usize,
    pub(crate) records: Vec<EntryRecord>,
    /// Highest position in the image an offset may point to once relocated.
    pub(crate) max_offset: u64,
}

fn overflow(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} does not fit in a 32-bit ZIP archive", what),
    )
}

impl BespokeWriter {
    /// Reads `executable` to the end and starts an empty archive after it.
    pub fn new<R: Read>(executable: R) -> Result<BespokeWriter, BuildError> {
        Self::with_limit(executable, MAX_EXECUTABLE_LEN)
    }

    pub(crate) fn with_limit<R: Read>(
        executable: R,
        limit: u64,
    ) -> Result<BespokeWriter, BuildError> {
        let mut buf = vec![];
        executable
            .take(limit + 1)
            .read_to_end(&mut buf)
            .map_err(BuildError::ReadExecutable)?;

        if buf.len() as u64 > limit {
            return Err(BuildError::ExecutableTooLarge(limit));
        }

        tracing::debug!(executable_len = buf.len(), "buffered executable");

        Ok(BespokeWriter {
            executable_len: buf.len(),
            buf,
            records: vec![],
            max_offset: u32::MAX as u64,
        })
    }

    pub fn executable_len(&self) -> usize {
        self.executable_len
    }

    /// Entries added so far, with offsets relative to the archive segment.
    pub fn records(&self) -> &[EntryRecord] {
        &self.records
    }

    #[inline(always)]
    fn archive_len(&self) -> usize {
        self.buf.len() - self.executable_len
    }

    /// Appends a stored entry named `name`.
    ///
    /// Names are not checked for uniqueness; a repeated name produces a
    /// second record, and readers see the first.
    pub fn insert(&mut self, name: &str, content: &[u8]) -> Result<&EntryRecord, BuildError> {
        self.insert_inner(name, content)
            .map_err(|e| BuildError::EntryWriteFailure(e, name.to_string()))?;

        // insert_inner always pushes on success
        Ok(&self.records[self.records.len() - 1])
    }

    fn insert_inner(&mut self, name: &str, content: &[u8]) -> io::Result<()> {
        if name.len() > u16::MAX as usize {
            return Err(overflow("entry name"));
        }
        if self.records.len() >= ZIP64_COUNT_SENTINEL as usize - 1 {
            return Err(overflow("entry count"));
        }

        let size = u32::try_from(content.len()).map_err(|_| overflow("entry size"))?;

        // Offsets are checked as they will be after relocation. The entry's
        // end is where the next entry or the central directory begins.
        let end = self.buf.len() as u64
            + (LOCAL_HEADER_LEN + name.len() + 4 + EXTENDED_TIMESTAMP_LEN as usize) as u64
            + size as u64;
        if end > self.max_offset {
            return Err(overflow("entry offset"));
        }
        let offset = self.archive_len() as u32;

        let now = chrono::Local::now();
        let (dos_date, dos_time) = to_dos(&now);

        let record = EntryRecord {
            name: name.to_string(),
            flags: if name.is_ascii() { 0 } else { FLAG_UTF8 },
            method: METHOD_STORED,
            dos_time,
            dos_date,
            mtime: i32::try_from(now.timestamp()).ok(),
            crc32: crc32fast::hash(content),
            compressed_size: size,
            size,
            external_attrs: unix_mode(DEFAULT_PERMISSIONS),
            offset,
        };

        let start = self.buf.len();
        LocalHeader(&record).write(&mut self.buf)?;
        self.buf.extend_from_slice(content);

        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", self.buf.len()),
            bytes = self.buf.len() - start,
            entry = %name,
            "wrote entry"
        );

        self.records.push(record);
        Ok(())
    }

    /// Reads the file at `path` and adds it under its file name. Directory
    /// components are dropped.
    pub fn insert_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&EntryRecord, BuildError> {
        let path = path.as_ref();
        let name = entry_name(path)
            .map_err(|e| BuildError::InvalidSourcePath(e, path.to_path_buf()))?;
        let content =
            std::fs::read(path).map_err(|e| BuildError::ReadSource(e, path.to_path_buf()))?;

        self.insert(&name, &content)
    }

    /// Writes the central directory and trailer, then relocates every offset
    /// in them by the length of the executable.
    pub fn finish(mut self) -> Result<BespokeImage, BuildError> {
        if self.buf.len() as u64 > self.max_offset {
            return Err(BuildError::EntryWriteFailure(
                overflow("central directory offset"),
                "central directory".into(),
            ));
        }

        let directory_offset = self.archive_len();
        let directory_start = self.buf.len();

        let write = |buf: &mut Vec<u8>, records: &[EntryRecord]| -> io::Result<()> {
            for record in records {
                record.write(buf)?;
            }

            let directory_size = buf.len() - directory_start;
            Trailer {
                entries: records.len() as u16,
                directory_size: u32::try_from(directory_size)
                    .map_err(|_| overflow("central directory"))?,
                directory_offset: u32::try_from(directory_offset)
                    .map_err(|_| overflow("central directory offset"))?,
                comment_len: 0,
            }
            .write(buf)
        };

        write(&mut self.buf, &self.records)
            .map_err(|e| BuildError::EntryWriteFailure(e, "central directory".into()))?;

        tracing::debug!(
            start = format_args!("{:#x}", directory_start),
            end = format_args!("{:#x}", self.buf.len()),
            entries = self.records.len(),
            "wrote central directory"
        );

        // Bounded by MAX_EXECUTABLE_LEN at construction.
        let shift = self.executable_len as u32;
        relocate(&mut self.buf[self.executable_len..], shift).map_err(BuildError::CorruptArchive)?;

        Ok(BespokeImage::new(self.buf, self.executable_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::de::{find_trailer, Deserialize};
    use crate::header::*;
    use byteorder::{ByteOrder, LittleEndian};

    fn directory(bytes: &[u8]) -> (Trailer, Vec<EntryRecord>) {
        let pos = find_trailer(bytes).unwrap();
        let (trailer, _) = Trailer::read_at(bytes, pos).unwrap();
        let mut cursor = trailer.directory_offset as usize;
        let mut records = vec![];
        for _ in 0..trailer.entries {
            let (record, len) = EntryRecord::read_at(bytes, cursor).unwrap();
            records.push(record);
            cursor += len;
        }
        (trailer, records)
    }

    fn build(exe: &[u8]) -> BespokeImage {
        let mut writer = BespokeWriter::new(exe).unwrap();
        writer.insert("one.txt", b"first").unwrap();
        writer.insert("two.txt", b"second entry").unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn executable_prefix_preserved() {
        let image = build(b"EXE_BYTES!");
        assert_eq!(&image.as_bytes()[..10], b"EXE_BYTES!");
        assert_eq!(image.executable_len(), 10);
    }

    #[test]
    fn offsets_shifted_by_executable_length() {
        let bare = build(b"");
        let exe = vec![0x7fu8; 1234];
        let image = build(&exe);

        let (bare_trailer, bare_records) = directory(bare.as_bytes());
        let (trailer, records) = directory(image.as_bytes());

        assert_eq!(trailer.directory_offset, bare_trailer.directory_offset + 1234);
        assert_eq!(records.len(), 2);
        for (bare, shifted) in bare_records.iter().zip(records.iter()) {
            assert_eq!(shifted.offset, bare.offset + 1234);
            assert_eq!(shifted.name, bare.name);
        }

        // Each relocated offset lands on a local header within the image.
        for record in records {
            let pos = record.offset as usize;
            assert_eq!(
                LittleEndian::read_u32(&image.as_bytes()[pos..]),
                LOCAL_HEADER_SIGNATURE
            );
        }
    }

    #[test]
    fn archive_segment_is_unchanged_apart_from_offsets() {
        let bare = build(b"");
        let image = build(b"12345678");
        assert_eq!(bare.as_bytes().len() + 8, image.as_bytes().len());

        // Local headers and data are byte-identical.
        let (trailer, _) = directory(bare.as_bytes());
        let directory_start = trailer.directory_offset as usize;
        assert_eq!(
            &bare.as_bytes()[..directory_start],
            &image.as_bytes()[8..8 + directory_start]
        );
    }

    #[test]
    fn record_metadata() {
        let mut writer = BespokeWriter::new(&b"exe"[..]).unwrap();
        let record = writer.insert("file.bin", b"hello").unwrap().clone();

        assert_eq!(record.offset, 0);
        assert_eq!(record.size, 5);
        assert_eq!(record.compressed_size, 5);
        assert_eq!(record.crc32, crc32fast::hash(b"hello"));
        assert_eq!(record.method, METHOD_STORED);
        assert_eq!(record.permissions(), Some(0o644));
        assert!(record.mtime.is_some());
        assert_eq!(record.flags, 0);

        let record = writer.insert("naïve.txt", b"").unwrap();
        assert_eq!(record.flags, FLAG_UTF8);
        assert_eq!(record.offset, (30 + 8 + 9 + 5) as u32);
    }

    #[test]
    fn duplicate_names_produce_two_records() {
        let mut writer = BespokeWriter::new(&b"exe"[..]).unwrap();
        writer.insert("same", b"first").unwrap();
        writer.insert("same", b"second").unwrap();
        let image = writer.finish().unwrap();

        let (trailer, records) = directory(image.as_bytes());
        assert_eq!(trailer.entries, 2);
        assert_eq!(records[0].name, "same");
        assert_eq!(records[1].name, "same");
        assert_ne!(records[0].offset, records[1].offset);
    }

    #[test]
    fn empty_archive() {
        let image = BespokeWriter::new(&b"exe"[..]).unwrap().finish().unwrap();
        assert_eq!(image.as_bytes().len(), 3 + TRAILER_LEN);
        let (trailer, records) = directory(image.as_bytes());
        assert_eq!(trailer.entries, 0);
        assert_eq!(trailer.directory_offset, 3);
        assert!(records.is_empty());
    }

    #[test]
    fn executable_at_limit() {
        let exe = vec![1u8; 64];
        let writer = BespokeWriter::with_limit(&exe[..], 64).unwrap();
        assert_eq!(writer.executable_len(), 64);
        writer.finish().unwrap();
    }

    #[test]
    fn executable_over_limit() {
        let exe = vec![1u8; 65];
        assert!(matches!(
            BespokeWriter::with_limit(&exe[..], 64),
            Err(BuildError::ExecutableTooLarge(64))
        ));
    }

    #[test]
    fn relocated_offset_overflow_fails_the_entry() {
        let mut writer = BespokeWriter::new(&[1u8; 64][..]).unwrap();
        writer.max_offset = 64 + 100;

        // Header, name, timestamp and data end at 64 + 30 + 4 + 9 + 10 = 117.
        writer.insert("fits", &[0u8; 10]).unwrap();
        assert!(matches!(
            writer.insert("spills", &[0u8; 100]),
            Err(BuildError::EntryWriteFailure(_, name)) if name == "spills"
        ));
        assert_eq!(writer.records().len(), 1);

        // The rejected entry left nothing behind.
        let image = writer.finish().unwrap();
        let (_, records) = directory(image.as_bytes());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn relocated_directory_overflow_fails_the_build() {
        let mut writer = BespokeWriter::new(&[1u8; 64][..]).unwrap();
        writer.insert("a", b"x").unwrap();
        writer.max_offset = 64;

        assert!(matches!(
            writer.finish(),
            Err(BuildError::EntryWriteFailure(_, name)) if name == "central directory"
        ));
    }

    #[test]
    fn executable_read_failure() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
            }
        }

        assert!(matches!(
            BespokeWriter::new(Broken),
            Err(BuildError::ReadExecutable(_))
        ));
    }

    #[test]
    fn insert_file_uses_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        let path = nested.join("payload.txt");
        std::fs::write(&path, b"payload").unwrap();

        let mut writer = BespokeWriter::new(&b"exe"[..]).unwrap();
        let record = writer.insert_file(&path).unwrap();
        assert_eq!(record.name, "payload.txt");
        assert_eq!(record.size, 7);
    }

    #[test]
    fn insert_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = BespokeWriter::new(&b"exe"[..]).unwrap();
        assert!(matches!(
            writer.insert_file(dir.path().join("nope.txt")),
            Err(BuildError::ReadSource(..))
        ));
        assert!(matches!(
            writer.insert_file("/"),
            Err(BuildError::InvalidSourcePath(..))
        ));
    }
}
