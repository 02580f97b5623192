//! Shifts the offsets stored in a ZIP archive so they stay valid once the
//! archive is prefixed by `shift` bytes of something else.
//!
//! Only two kinds of field hold offsets: the central directory offset in the
//! trailer, and the local header offset in each central directory record.
//! This is the same adjustment `zip -A` makes to self-extracting archives.

use byteorder::{ByteOrder, LittleEndian};

use crate::de::{expect_signature, find_trailer, slice};
use crate::header::*;
use crate::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    /// Number of central directory records patched.
    pub entries: u16,

    /// Central directory offset before relocation.
    pub directory_offset: u32,
}

/// Adds `shift` to a little-endian `u32` at `pos`, returning the old value.
fn shift_u32(buf: &mut [u8], pos: usize, shift: u32) -> Result<u32, FormatError> {
    let field = pos
        .checked_add(4)
        .and_then(|end| buf.get_mut(pos..end))
        .ok_or(FormatError::Truncated(pos))?;

    let value = LittleEndian::read_u32(field);
    if value == ZIP64_OFFSET_SENTINEL {
        return Err(FormatError::Zip64Unsupported);
    }

    let shifted = value
        .checked_add(shift)
        .ok_or(FormatError::OffsetOverflow(value))?;
    LittleEndian::write_u32(field, shifted);
    Ok(value)
}

/// Relocates `archive` in place by `shift` bytes.
///
/// `archive` must hold exactly the archive segment, starting at its first
/// local header. On error the buffer may be partially patched and must be
/// discarded.
pub fn relocate(archive: &mut [u8], shift: u32) -> Result<Relocation, FormatError> {
    let trailer = find_trailer(archive).ok_or(FormatError::MissingTrailer)?;

    let entries = LittleEndian::read_u16(slice(archive, trailer + TRAILER_COUNT_OFFSET, 2)?);
    if entries == ZIP64_COUNT_SENTINEL {
        return Err(FormatError::Zip64Unsupported);
    }

    let directory_offset = shift_u32(archive, trailer + TRAILER_DIR_OFFSET_OFFSET, shift)?;

    tracing::debug!(
        trailer = format_args!("{:#x}", trailer),
        entries,
        directory_offset = format_args!("{:#x}", directory_offset),
        shift = format_args!("{:#x}", shift),
        "relocating archive"
    );

    // The directory has not moved within the buffer; only the meaning of its
    // offset changed, so the walk starts from the original value.
    let mut cursor = directory_offset as usize;

    for _ in 0..entries {
        expect_signature(archive, cursor, CENTRAL_HEADER_SIGNATURE)?;
        let fixed = slice(archive, cursor, CENTRAL_HEADER_LEN)?;

        let name_len = LittleEndian::read_u16(&fixed[CENTRAL_NAME_LEN_OFFSET..]) as usize;
        let extra_len = LittleEndian::read_u16(&fixed[CENTRAL_EXTRA_LEN_OFFSET..]) as usize;
        let comment_len = LittleEndian::read_u16(&fixed[CENTRAL_COMMENT_LEN_OFFSET..]) as usize;

        let offset = shift_u32(archive, cursor + CENTRAL_LOCAL_OFFSET_OFFSET, shift)?;
        tracing::trace!(
            record = format_args!("{:#x}", cursor),
            from = format_args!("{:#x}", offset),
            to = format_args!("{:#x}", offset as u64 + shift as u64),
            "relocated local header offset"
        );

        cursor += CENTRAL_HEADER_LEN + name_len + extra_len + comment_len;
    }

    Ok(Relocation {
        entries,
        directory_offset,
    })
}
