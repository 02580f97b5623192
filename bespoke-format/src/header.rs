//! Byte layout of the ZIP records written into the archive segment.
//!
//! All multi-byte fields are little-endian. Offsets are relative to the
//! start of the record they belong to.

pub(crate) const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
pub(crate) const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
pub(crate) const TRAILER_SIGNATURE: u32 = 0x0605_4b50;

/// `PK\x05\x06`, as it appears on disk.
pub(crate) const TRAILER_MAGIC: &[u8; 4] = b"PK\x05\x06";

pub(crate) const LOCAL_HEADER_LEN: usize = 30;
pub(crate) const LOCAL_NAME_LEN_OFFSET: usize = 26;
pub(crate) const LOCAL_EXTRA_LEN_OFFSET: usize = 28;

pub(crate) const CENTRAL_HEADER_LEN: usize = 46;
pub(crate) const CENTRAL_NAME_LEN_OFFSET: usize = 28;
pub(crate) const CENTRAL_EXTRA_LEN_OFFSET: usize = 30;
pub(crate) const CENTRAL_COMMENT_LEN_OFFSET: usize = 32;
pub(crate) const CENTRAL_LOCAL_OFFSET_OFFSET: usize = 42;

pub(crate) const TRAILER_LEN: usize = 22;
pub(crate) const TRAILER_COUNT_OFFSET: usize = 10;
pub(crate) const TRAILER_DIR_SIZE_OFFSET: usize = 12;
pub(crate) const TRAILER_DIR_OFFSET_OFFSET: usize = 16;
pub(crate) const TRAILER_COMMENT_LEN_OFFSET: usize = 20;

/// The trailer comment is at most `u16::MAX` bytes, which bounds the backward scan.
pub(crate) const MAX_TRAILER_SEARCH: usize = TRAILER_LEN + u16::MAX as usize;

pub(crate) const VERSION_NEEDED: u16 = 20;
/// Upper byte 3 marks the external attributes as Unix mode bits.
pub(crate) const VERSION_MADE_BY: u16 = (3 << 8) | 20;

pub(crate) const FLAG_ENCRYPTED: u16 = 0x0001;
pub(crate) const FLAG_UTF8: u16 = 0x0800;

pub(crate) const METHOD_STORED: u16 = 0;
pub(crate) const METHOD_DEFLATED: u16 = 8;

pub(crate) const EXTENDED_TIMESTAMP_ID: u16 = 0x5455;
pub(crate) const EXTENDED_TIMESTAMP_MTIME: u8 = 0x01;
pub(crate) const EXTENDED_TIMESTAMP_LEN: u16 = 5;

pub(crate) const S_IFREG: u32 = 0o100_000;

/// Permission bits given to every entry.
pub const DEFAULT_PERMISSIONS: u32 = 0o644;

/// Largest executable that may prefix an archive. Half of what a 32-bit
/// offset field can address, leaving the other half for the archive itself.
pub const MAX_EXECUTABLE_LEN: u64 = u32::MAX as u64 / 2;

pub(crate) const ZIP64_COUNT_SENTINEL: u16 = u16::MAX;
pub(crate) const ZIP64_OFFSET_SENTINEL: u32 = u32::MAX;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailer_magic_matches_signature() {
        assert_eq!(TRAILER_MAGIC, &TRAILER_SIGNATURE.to_le_bytes());
    }

    #[test]
    fn executable_limit() {
        assert_eq!(MAX_EXECUTABLE_LEN, 2_147_483_647);
    }
}
