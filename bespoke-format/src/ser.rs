use std::io::{Result, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::header::*;
use crate::record::{EntryRecord, Trailer};

pub(crate) trait Serialize {
    fn write<W: Write>(&self, writer: &mut W) -> Result<()>;
}

/// The local file header preceding an entry's data.
pub(crate) struct LocalHeader<'a>(pub(crate) &'a EntryRecord);

fn extra_len(record: &EntryRecord) -> u16 {
    match record.mtime {
        Some(_) => 4 + EXTENDED_TIMESTAMP_LEN,
        None => 0,
    }
}

fn write_extra<W: Write>(writer: &mut W, record: &EntryRecord) -> Result<()> {
    if let Some(mtime) = record.mtime {
        writer.write_u16::<LittleEndian>(EXTENDED_TIMESTAMP_ID)?;
        writer.write_u16::<LittleEndian>(EXTENDED_TIMESTAMP_LEN)?;
        writer.write_u8(EXTENDED_TIMESTAMP_MTIME)?;
        writer.write_i32::<LittleEndian>(mtime)?;
    }
    Ok(())
}

impl Serialize for LocalHeader<'_> {
    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let record = self.0;

        writer.write_u32::<LittleEndian>(LOCAL_HEADER_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(VERSION_NEEDED)?;
        writer.write_u16::<LittleEndian>(record.flags)?;
        writer.write_u16::<LittleEndian>(record.method)?;
        writer.write_u16::<LittleEndian>(record.dos_time)?;
        writer.write_u16::<LittleEndian>(record.dos_date)?;
        writer.write_u32::<LittleEndian>(record.crc32)?;
        writer.write_u32::<LittleEndian>(record.compressed_size)?;
        writer.write_u32::<LittleEndian>(record.size)?;
        writer.write_u16::<LittleEndian>(record.name.len() as u16)?;
        writer.write_u16::<LittleEndian>(extra_len(record))?;
        writer.write_all(record.name.as_bytes())?;
        write_extra(writer, record)
    }
}

impl Serialize for EntryRecord {
    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(CENTRAL_HEADER_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(VERSION_MADE_BY)?;
        writer.write_u16::<LittleEndian>(VERSION_NEEDED)?;
        writer.write_u16::<LittleEndian>(self.flags)?;
        writer.write_u16::<LittleEndian>(self.method)?;
        writer.write_u16::<LittleEndian>(self.dos_time)?;
        writer.write_u16::<LittleEndian>(self.dos_date)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.compressed_size)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_u16::<LittleEndian>(self.name.len() as u16)?;
        writer.write_u16::<LittleEndian>(extra_len(self))?;
        writer.write_u16::<LittleEndian>(0)?; // comment length
        writer.write_u16::<LittleEndian>(0)?; // disk number start
        writer.write_u16::<LittleEndian>(0)?; // internal attributes
        writer.write_u32::<LittleEndian>(self.external_attrs)?;
        writer.write_u32::<LittleEndian>(self.offset)?;
        writer.write_all(self.name.as_bytes())?;
        write_extra(writer, self)
    }
}

impl Serialize for Trailer {
    fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(TRAILER_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(0)?; // this disk
        writer.write_u16::<LittleEndian>(0)?; // disk holding the directory
        writer.write_u16::<LittleEndian>(self.entries)?;
        writer.write_u16::<LittleEndian>(self.entries)?;
        writer.write_u32::<LittleEndian>(self.directory_size)?;
        writer.write_u32::<LittleEndian>(self.directory_offset)?;
        writer.write_u16::<LittleEndian>(self.comment_len)
    }
}
