use std::path::Path;

use bespoke_format::{BespokeArchive, EntryRecord};
use humansize::{file_size_opts as options, FileSize};

use crate::error::{Error, Result};

#[inline(always)]
fn method(record: &EntryRecord) -> String {
    match record.method {
        0 => "Stored".into(),
        8 => "Deflate".into(),
        other => format!("Unknown({})", other),
    }
}

macro_rules! add {
    ($mode:ident, $bit:expr, $value:tt => $s:ident) => {
        if $mode & $bit != 0 {
            $s.push($value);
        } else {
            $s.push('-');
        }
    };
}

#[inline(always)]
fn from_mode(mode: u32) -> String {
    let mut s = String::with_capacity(9);
    add!(mode, 0o400, 'r' => s);
    add!(mode, 0o200, 'w' => s);
    add!(mode, 0o100, 'x' => s);
    add!(mode, 0o040, 'r' => s);
    add!(mode, 0o020, 'w' => s);
    add!(mode, 0o010, 'x' => s);
    add!(mode, 0o004, 'r' => s);
    add!(mode, 0o002, 'w' => s);
    add!(mode, 0o001, 'x' => s);
    s
}

#[inline(always)]
fn time(record: &EntryRecord) -> String {
    record
        .modified()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into())
}

#[inline(always)]
fn size(bytes: u32) -> String {
    bytes
        .file_size(options::BINARY)
        .unwrap_or_else(|_| bytes.to_string())
}

pub(crate) fn format_record(record: &EntryRecord) -> String {
    format!(
        "{:12}  {:>12}   {:>12}   {:<19}   {:<9}   {:08x}   {}",
        method(record),
        size(record.compressed_size),
        size(record.size),
        time(record),
        record
            .permissions()
            .map(from_mode)
            .unwrap_or_else(|| "-".into()),
        record.crc32,
        record.name(),
    )
}

pub fn run(path: &Path) -> Result<()> {
    let archive = BespokeArchive::open(path).map_err(|source| Error::OpenImage {
        path: path.to_path_buf(),
        source,
    })?;

    println!("Method        Compressed     Length         Modified              Mode        CRC32      Name");
    println!(
        "------------  -------------  -------------  -------------------   ---------   --------   --------"
    );
    for record in archive.entries() {
        println!("{}", format_record(record));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes() {
        assert_eq!(from_mode(0o644), "rw-r--r--");
        assert_eq!(from_mode(0o755), "rwxr-xr-x");
        assert_eq!(from_mode(0), "---------");
    }

    #[test]
    fn row() {
        let mut writer = bespoke_format::BespokeWriter::new(&b"EXE"[..]).unwrap();
        let record = writer.insert("notes.txt", b"hello").unwrap().clone();

        let row = format_record(&record);
        assert!(row.starts_with("Stored"));
        assert!(row.contains("rw-r--r--"));
        assert!(row.contains("3610a686"));
        assert!(row.ends_with("notes.txt"));
    }
}
