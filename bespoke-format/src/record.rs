use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Timelike};

use crate::header::{FLAG_ENCRYPTED, S_IFREG};

/// One entry of the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Entry name, exactly as stored.
    pub name: String,

    pub flags: u16,

    /// Compression method id; 0 for stored, 8 for deflate.
    pub method: u16,

    pub dos_time: u16,
    pub dos_date: u16,

    /// Modification time in seconds since the Unix epoch, from the extended
    /// timestamp field if one was present.
    pub mtime: Option<i32>,

    pub crc32: u32,

    /// Length of the data as stored in the archive.
    pub compressed_size: u32,

    /// Length of the data once decompressed.
    pub size: u32,

    pub external_attrs: u32,

    /// Offset of the local file header. Relative to the start of the archive
    /// segment while writing; absolute within the file once relocated.
    pub offset: u32,
}

impl EntryRecord {
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Unix permission bits, if the entry carries a Unix mode.
    pub fn permissions(&self) -> Option<u32> {
        let mode = self.external_attrs >> 16;
        if mode == 0 {
            None
        } else {
            Some(mode & 0o7777)
        }
    }

    /// Modification time, preferring the extended timestamp over DOS time.
    pub fn modified(&self) -> Option<NaiveDateTime> {
        if let Some(secs) = self.mtime {
            return DateTime::from_timestamp(secs as i64, 0).map(|t| t.naive_utc());
        }

        from_dos(self.dos_date, self.dos_time)
    }
}

pub(crate) fn unix_mode(permissions: u32) -> u32 {
    (S_IFREG | (permissions & 0o7777)) << 16
}

/// Converts to a DOS `(date, time)` pair. Times before 1980 clamp to the epoch.
pub(crate) fn to_dos(time: &DateTime<Local>) -> (u16, u16) {
    if time.year() < 1980 {
        return ((1 << 5) | 1, 0);
    }

    let date = (((time.year() - 1980) as u16) << 9)
        | ((time.month() as u16) << 5)
        | time.day() as u16;
    let time = ((time.hour() as u16) << 11)
        | ((time.minute() as u16) << 5)
        | (time.second() as u16 / 2);

    (date, time)
}

pub(crate) fn from_dos(date: u16, time: u16) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(
        1980 + (date >> 9) as i32,
        ((date >> 5) & 0xf) as u32,
        (date & 0x1f) as u32,
    )?
    .and_hms_opt(
        (time >> 11) as u32,
        ((time >> 5) & 0x3f) as u32,
        ((time & 0x1f) * 2) as u32,
    )
}

/// The end of central directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Trailer {
    pub(crate) entries: u16,
    pub(crate) directory_size: u32,
    pub(crate) directory_offset: u32,
    pub(crate) comment_len: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dos_round_trip() {
        let t = Local.with_ymd_and_hms(2015, 6, 9, 0, 11, 12).unwrap();
        let (date, time) = to_dos(&t);
        assert_eq!(from_dos(date, time), Some(t.naive_local()));
    }

    #[test]
    fn dos_odd_seconds_truncate() {
        let t = Local.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let (date, time) = to_dos(&t);
        let back = from_dos(date, time).unwrap();
        assert_eq!(back.second(), 4);
    }

    #[test]
    fn dos_clamps_before_1980() {
        let t = Local.with_ymd_and_hms(1970, 1, 1, 12, 0, 0).unwrap();
        let (date, time) = to_dos(&t);
        assert_eq!(
            from_dos(date, time),
            NaiveDate::from_ymd_opt(1980, 1, 1).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn permissions_from_mode() {
        let record = EntryRecord {
            name: "x".into(),
            flags: 0,
            method: 0,
            dos_time: 0,
            dos_date: 0,
            mtime: None,
            crc32: 0,
            compressed_size: 0,
            size: 0,
            external_attrs: unix_mode(0o644),
            offset: 0,
        };
        assert_eq!(record.external_attrs, 0o100644 << 16);
        assert_eq!(record.permissions(), Some(0o644));
    }
}
