use std::path::PathBuf;

use crate::path::IntoEntryNameError;

/// Structural problems in the ZIP records of an archive segment.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Could not find the end of central directory record.")]
    MissingTrailer,

    #[error("Record at offset {0:#x} is truncated.")]
    Truncated(usize),

    #[error("Unexpected record signature at offset {0:#x}.")]
    BadSignature(usize),

    #[error("ZIP64 archives are not supported.")]
    Zip64Unsupported,

    #[error("Offset {0:#x} cannot be relocated without overflowing 32 bits.")]
    OffsetOverflow(u32),

    #[error("Central directory lies outside of the file.")]
    DirectoryOutOfBounds,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read executable.")]
    ReadExecutable(#[source] std::io::Error),

    #[error("Executable is larger than the maximum of {0} bytes.")]
    ExecutableTooLarge(u64),

    #[error("Could not add entry to archive. Name: '{1}'")]
    EntryWriteFailure(#[source] std::io::Error, String),

    #[error("Failed to read source file. Path: '{}'", .1.display())]
    ReadSource(#[source] std::io::Error, PathBuf),

    #[error("Cannot derive an entry name from path. Path: '{}'", .1.display())]
    InvalidSourcePath(#[source] IntoEntryNameError, PathBuf),

    #[error("Archive metadata is corrupt; this is a bug.")]
    CorruptArchive(#[source] FormatError),

    #[error("{0} is not supported.")]
    Unsupported(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Could not locate the running executable.")]
    LocateSelf(#[source] std::io::Error),

    #[error("Failed to open file. Path: '{}'", .1.display())]
    OpenFailed(#[source] std::io::Error, PathBuf),

    #[error("Not a bespoke binary. Path: '{}'", .1.display())]
    NotBespokeBinary(#[source] FormatError, PathBuf),

    #[error("Entry not found in archive. Name: '{0}'")]
    EntryNotFound(String),

    #[error("Entry uses an unsupported method ({1}) or encryption. Name: '{0}'")]
    UnsupportedEntry(String, u16),

    #[error("Failed to read entry. Name: '{1}'")]
    ReadFailed(#[source] std::io::Error, String),

    #[error("Checksum mismatch. Name: '{0}'")]
    ChecksumMismatch(String),

    #[error("Embedded map is malformed.")]
    MalformedMap(#[source] serde_json::Error),
}
