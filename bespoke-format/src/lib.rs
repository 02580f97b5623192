//! Bespoke binaries are executables with a ZIP archive appended, so a single
//! file is both a runnable program and an archive that program can read back.
//!
//! Building happens ahead of time with [`with_map`] or [`with_file`] (or a
//! [`BespokeWriter`] directly). At run time the program calls [`read_map`] or
//! [`read_named_file`] to get at the data it was built with.

use std::io::Read;
use std::path::Path;

mod codec;
mod de;
mod error;
mod file;
mod header;
pub mod path;
mod record;
pub mod relocate;
mod ser;

pub use codec::{decode, encode, PayloadMap, MAP_ENTRY_NAME};
pub use error::{BuildError, FormatError, ReadError};
pub use file::reader::{BespokeArchive, BespokeReader, CurrentExe, LocateSelf};
pub use file::writer::BespokeWriter;
pub use file::BespokeImage;
pub use header::{DEFAULT_PERMISSIONS, MAX_EXECUTABLE_LEN};
pub use record::EntryRecord;

/// Builds a bespoke binary carrying `map`.
pub fn with_map<R: Read>(executable: R, map: &PayloadMap) -> Result<BespokeImage, BuildError> {
    let mut writer = BespokeWriter::new(executable)?;
    writer.insert(MAP_ENTRY_NAME, &encode(map))?;
    writer.finish()
}

/// Builds a bespoke binary carrying the file at `path`, stored under its
/// file name.
pub fn with_file<R: Read, P: AsRef<Path>>(
    executable: R,
    path: P,
) -> Result<BespokeImage, BuildError> {
    let mut writer = BespokeWriter::new(executable)?;
    writer.insert_file(path)?;
    writer.finish()
}

/// Packaging a directory tree is not supported. Whether entries would keep
/// their hierarchy or be flattened is undecided, so this always fails.
pub fn with_dir<R: Read, P: AsRef<Path>>(
    _executable: R,
    _path: P,
) -> Result<BespokeImage, BuildError> {
    Err(BuildError::Unsupported("Packaging a directory"))
}

/// Reads the map embedded in the running executable.
pub fn read_map() -> Result<PayloadMap, ReadError> {
    BespokeReader::new(CurrentExe).read_map()
}

/// Reads the entry `name` embedded in the running executable.
pub fn read_named_file(name: &str) -> Result<Vec<u8>, ReadError> {
    BespokeReader::new(CurrentExe).read_named_file(name)
}
