use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::DeflateDecoder;
use memmap2::Mmap;

use crate::{
    codec::{self, PayloadMap, MAP_ENTRY_NAME},
    de::{find_trailer, local_data_start, slice, Deserialize},
    header::{METHOD_DEFLATED, METHOD_STORED, TRAILER_LEN},
    record::{EntryRecord, Trailer},
    FormatError, ReadError,
};

/// Resolves the path of the image to read from.
pub trait LocateSelf {
    fn locate(&self) -> std::io::Result<PathBuf>;
}

/// Locates the executable of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentExe;

impl LocateSelf for CurrentExe {
    fn locate(&self) -> std::io::Result<PathBuf> {
        std::env::current_exe()
    }
}

impl LocateSelf for PathBuf {
    fn locate(&self) -> std::io::Result<PathBuf> {
        Ok(self.clone())
    }
}

impl<T: LocateSelf + ?Sized> LocateSelf for &T {
    fn locate(&self) -> std::io::Result<PathBuf> {
        (**self).locate()
    }
}

/// A memory-mapped file whose tail is a ZIP archive, whatever precedes it.
#[derive(Debug)]
pub struct BespokeArchive {
    path: PathBuf,
    mmap: Mmap,
    /// Distance between the offsets stored in the archive and actual
    /// positions in the file. Zero for a relocated image.
    base: usize,
    records: Vec<EntryRecord>,
}

fn read_directory(buf: &[u8]) -> Result<(usize, Vec<EntryRecord>), FormatError> {
    let pos = find_trailer(buf).ok_or(FormatError::MissingTrailer)?;
    let (trailer, _) = Trailer::read_at(buf, pos)?;

    let base = pos
        .checked_sub(trailer.directory_size as usize)
        .and_then(|p| p.checked_sub(trailer.directory_offset as usize))
        .ok_or(FormatError::DirectoryOutOfBounds)?;

    let mut cursor = base + trailer.directory_offset as usize;
    let mut records = Vec::with_capacity(trailer.entries as usize);
    for _ in 0..trailer.entries {
        let (record, len) = EntryRecord::read_at(buf, cursor)?;
        records.push(record);
        cursor += len;
    }

    Ok((base, records))
}

impl BespokeArchive {
    /// Opens the archive at the end of the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<BespokeArchive, ReadError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| ReadError::OpenFailed(e, path.clone()))?;
        let len = file
            .metadata()
            .map_err(|e| ReadError::OpenFailed(e, path.clone()))?
            .len();

        if len < TRAILER_LEN as u64 {
            return Err(ReadError::NotBespokeBinary(FormatError::MissingTrailer, path));
        }

        // SAFETY: the mapping is only ever read; a concurrent truncation of
        // the file is outside of what this type can guard against.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ReadError::OpenFailed(e, path.clone()))?;

        let (base, records) =
            read_directory(&mmap).map_err(|e| ReadError::NotBespokeBinary(e, path.clone()))?;

        tracing::debug!(
            path = %path.display(),
            base = format_args!("{:#x}", base),
            entries = records.len(),
            "opened archive"
        );

        Ok(BespokeArchive {
            path,
            mmap,
            base,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in central directory order.
    pub fn entries(&self) -> &[EntryRecord] {
        &self.records
    }

    /// Finds the first entry called `name`.
    pub fn entry(&self, name: &str) -> Option<&EntryRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Reads the content of the first entry called `name`.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, ReadError> {
        let record = self
            .entry(name)
            .ok_or_else(|| ReadError::EntryNotFound(name.to_string()))?;
        self.read_record(record)
    }

    pub fn read_record(&self, record: &EntryRecord) -> Result<Vec<u8>, ReadError> {
        if record.is_encrypted() || !matches!(record.method, METHOD_STORED | METHOD_DEFLATED) {
            return Err(ReadError::UnsupportedEntry(
                record.name.clone(),
                record.method,
            ));
        }

        let corrupt = |e| ReadError::NotBespokeBinary(e, self.path.clone());
        let start = local_data_start(&self.mmap, self.base + record.offset as usize)
            .map_err(corrupt)?;
        let data = slice(&self.mmap, start, record.compressed_size as usize).map_err(corrupt)?;

        let content = match record.method {
            METHOD_DEFLATED => {
                // One byte past the recorded size is enough to tell it was wrong.
                let mut out = vec![];
                DeflateDecoder::new(data)
                    .take(record.size as u64 + 1)
                    .read_to_end(&mut out)
                    .map_err(|e| ReadError::ReadFailed(e, record.name.clone()))?;
                out
            }
            _ => data.to_vec(),
        };

        if content.len() != record.size as usize {
            return Err(ReadError::ReadFailed(
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!(
                        "expected {} bytes, found {}",
                        record.size,
                        content.len()
                    ),
                ),
                record.name.clone(),
            ));
        }

        if crc32fast::hash(&content) != record.crc32 {
            return Err(ReadError::ChecksumMismatch(record.name.clone()));
        }

        tracing::debug!(
            entry = %record.name,
            start = format_args!("{:#x}", start),
            bytes = content.len(),
            "read entry"
        );

        Ok(content)
    }
}

/// Reads entries out of the image found by a [`LocateSelf`].
///
/// Each call opens the image afresh; nothing is cached between calls.
#[derive(Debug, Default, Clone)]
pub struct BespokeReader<L = CurrentExe> {
    locator: L,
}

impl<L: LocateSelf> BespokeReader<L> {
    pub fn new(locator: L) -> BespokeReader<L> {
        BespokeReader { locator }
    }

    pub fn open(&self) -> Result<BespokeArchive, ReadError> {
        let path = self.locator.locate().map_err(ReadError::LocateSelf)?;
        BespokeArchive::open(path)
    }

    /// Reads and decodes the embedded map.
    pub fn read_map(&self) -> Result<PayloadMap, ReadError> {
        let bytes = self.open()?.read(MAP_ENTRY_NAME)?;
        codec::decode(&bytes)
    }

    pub fn read_named_file(&self, name: &str) -> Result<Vec<u8>, ReadError> {
        self.open()?.read(name)
    }
}
