use byteorder::{ByteOrder, LittleEndian};

use crate::header::*;
use crate::record::{EntryRecord, Trailer};
use crate::FormatError;

pub(crate) trait Deserialize: Sized {
    /// Parses the record starting at `pos`, returning it with its total length in bytes.
    fn read_at(buf: &[u8], pos: usize) -> Result<(Self, usize), FormatError>;
}

#[inline(always)]
pub(crate) fn slice(buf: &[u8], pos: usize, len: usize) -> Result<&[u8], FormatError> {
    pos.checked_add(len)
        .and_then(|end| buf.get(pos..end))
        .ok_or(FormatError::Truncated(pos))
}

#[inline(always)]
pub(crate) fn expect_signature(buf: &[u8], pos: usize, signature: u32) -> Result<(), FormatError> {
    if LittleEndian::read_u32(slice(buf, pos, 4)?) != signature {
        return Err(FormatError::BadSignature(pos));
    }
    Ok(())
}

/// Finds the end of central directory record by scanning backwards for its
/// signature. A candidate whose comment would run past the end of `buf` is
/// skipped, since the signature bytes may also appear inside a comment.
pub(crate) fn find_trailer(buf: &[u8]) -> Option<usize> {
    let start = buf.len().saturating_sub(MAX_TRAILER_SEARCH);
    let mut end = buf.len();

    while let Some(found) = twoway::rfind_bytes(&buf[start..end], TRAILER_MAGIC) {
        let pos = start + found;

        if pos + TRAILER_LEN <= buf.len() {
            let comment_len =
                LittleEndian::read_u16(&buf[pos + TRAILER_COMMENT_LEN_OFFSET..]) as usize;
            if pos + TRAILER_LEN + comment_len <= buf.len() {
                return Some(pos);
            }
        }

        end = pos + TRAILER_MAGIC.len() - 1;
    }

    None
}

impl Deserialize for Trailer {
    fn read_at(buf: &[u8], pos: usize) -> Result<(Self, usize), FormatError> {
        expect_signature(buf, pos, TRAILER_SIGNATURE)?;
        let bytes = slice(buf, pos, TRAILER_LEN)?;

        let trailer = Trailer {
            entries: LittleEndian::read_u16(&bytes[TRAILER_COUNT_OFFSET..]),
            directory_size: LittleEndian::read_u32(&bytes[TRAILER_DIR_SIZE_OFFSET..]),
            directory_offset: LittleEndian::read_u32(&bytes[TRAILER_DIR_OFFSET_OFFSET..]),
            comment_len: LittleEndian::read_u16(&bytes[TRAILER_COMMENT_LEN_OFFSET..]),
        };

        if trailer.entries == ZIP64_COUNT_SENTINEL
            || trailer.directory_size == ZIP64_OFFSET_SENTINEL
            || trailer.directory_offset == ZIP64_OFFSET_SENTINEL
        {
            return Err(FormatError::Zip64Unsupported);
        }

        tracing::debug!(
            start = format_args!("{:#x}", pos),
            entries = trailer.entries,
            directory_offset = format_args!("{:#x}", trailer.directory_offset),
            directory_size = trailer.directory_size,
            "deserialized Trailer"
        );

        Ok((trailer, TRAILER_LEN + trailer.comment_len as usize))
    }
}

fn extended_mtime(mut extra: &[u8]) -> Option<i32> {
    while extra.len() >= 4 {
        let id = LittleEndian::read_u16(extra);
        let len = LittleEndian::read_u16(&extra[2..]) as usize;
        let data = extra.get(4..4 + len)?;

        if id == EXTENDED_TIMESTAMP_ID
            && data.len() >= 5
            && data[0] & EXTENDED_TIMESTAMP_MTIME != 0
        {
            return Some(LittleEndian::read_i32(&data[1..]));
        }

        extra = &extra[4 + len..];
    }

    None
}

impl Deserialize for EntryRecord {
    fn read_at(buf: &[u8], pos: usize) -> Result<(Self, usize), FormatError> {
        expect_signature(buf, pos, CENTRAL_HEADER_SIGNATURE)?;
        let fixed = slice(buf, pos, CENTRAL_HEADER_LEN)?;

        let name_len = LittleEndian::read_u16(&fixed[CENTRAL_NAME_LEN_OFFSET..]) as usize;
        let extra_len = LittleEndian::read_u16(&fixed[CENTRAL_EXTRA_LEN_OFFSET..]) as usize;
        let comment_len = LittleEndian::read_u16(&fixed[CENTRAL_COMMENT_LEN_OFFSET..]) as usize;

        let name = slice(buf, pos + CENTRAL_HEADER_LEN, name_len)?;
        let extra = slice(buf, pos + CENTRAL_HEADER_LEN + name_len, extra_len)?;
        let total = CENTRAL_HEADER_LEN + name_len + extra_len + comment_len;
        slice(buf, pos, total)?;

        let record = EntryRecord {
            name: String::from_utf8_lossy(name).into_owned(),
            flags: LittleEndian::read_u16(&fixed[8..]),
            method: LittleEndian::read_u16(&fixed[10..]),
            dos_time: LittleEndian::read_u16(&fixed[12..]),
            dos_date: LittleEndian::read_u16(&fixed[14..]),
            mtime: extended_mtime(extra),
            crc32: LittleEndian::read_u32(&fixed[16..]),
            compressed_size: LittleEndian::read_u32(&fixed[20..]),
            size: LittleEndian::read_u32(&fixed[24..]),
            external_attrs: LittleEndian::read_u32(&fixed[38..]),
            offset: LittleEndian::read_u32(&fixed[CENTRAL_LOCAL_OFFSET_OFFSET..]),
        };

        if record.offset == ZIP64_OFFSET_SENTINEL
            || record.size == ZIP64_OFFSET_SENTINEL
            || record.compressed_size == ZIP64_OFFSET_SENTINEL
        {
            return Err(FormatError::Zip64Unsupported);
        }

        tracing::debug!(
            start = format_args!("{:#x}", pos),
            end = format_args!("{:#x}", pos + total),
            bytes = total,
            entry = %record.name,
            "deserialized EntryRecord"
        );

        Ok((record, total))
    }
}

/// Returns the position of an entry's data given the position of its local header.
pub(crate) fn local_data_start(buf: &[u8], pos: usize) -> Result<usize, FormatError> {
    expect_signature(buf, pos, LOCAL_HEADER_SIGNATURE)?;
    let fixed = slice(buf, pos, LOCAL_HEADER_LEN)?;
    let name_len = LittleEndian::read_u16(&fixed[LOCAL_NAME_LEN_OFFSET..]) as usize;
    let extra_len = LittleEndian::read_u16(&fixed[LOCAL_EXTRA_LEN_OFFSET..]) as usize;
    Ok(pos + LOCAL_HEADER_LEN + name_len + extra_len)
}
