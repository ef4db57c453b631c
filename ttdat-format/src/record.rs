use crate::{
    compression::Codec,
    error::{Error, Result, Violation},
    path::ArchivePath,
    reader::ByteReader,
};

/// Size of one file-info record.
pub const FILE_INFO_STRIDE: u64 = 16;

const SIGNATURE_BYTE_OFFSETS: i32 = -1;
const SIGNATURE_BLOCK_OFFSETS: i32 = -3;

/// Layout variant of the file-info table, fixed for the whole archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// `-1`: byte offsets, never compressed.
    ByteOffsets,
    /// `-3`: offsets in 256-byte units, codec in the packed-type field.
    BlockOffsets,
}

impl Signature {
    pub const fn from_tag(tag: i32) -> Option<Signature> {
        match tag {
            SIGNATURE_BYTE_OFFSETS => Some(Signature::ByteOffsets),
            SIGNATURE_BLOCK_OFFSETS => Some(Signature::BlockOffsets),
            _ => None,
        }
    }

    pub const fn tag(self) -> i32 {
        match self {
            Signature::ByteOffsets => SIGNATURE_BYTE_OFFSETS,
            Signature::BlockOffsets => SIGNATURE_BLOCK_OFFSETS,
        }
    }

    /// Decodes record `index` of the table starting at `base`.
    ///
    /// Every record is `offset: u32, packed: u32, unpacked: u32,
    /// packed_type: u24, fine_offset: u8`.
    pub fn decode(self, reader: &ByteReader<'_>, base: u64, index: u32) -> Result<FileInfoRecord> {
        let offset = base + u64::from(index) * FILE_INFO_STRIDE;
        let raw = RawRecord::read(reader, offset)?;

        let record = match self {
            Signature::ByteOffsets => decode_byte_offsets(raw),
            Signature::BlockOffsets => Ok(decode_block_offsets(raw)),
        }
        .map_err(|violation| Error::FormatInvariantViolation {
            index,
            offset,
            violation,
        })?;

        tracing::debug!(
            index,
            record = format_args!("{:#x}", offset),
            data = format_args!("{:#x}", record.data_offset),
            packed = record.packed_size,
            unpacked = record.unpacked_size,
            codec = %record.codec,
            "decoded file info"
        );

        Ok(record)
    }
}

struct RawRecord {
    offset: u32,
    packed_size: u32,
    unpacked_size: u32,
    packed_type: u32,
    fine_offset: u8,
}

impl RawRecord {
    fn read(reader: &ByteReader<'_>, offset: u64) -> Result<RawRecord> {
        // One bounds check for the whole record.
        reader.read_bytes(offset, FILE_INFO_STRIDE)?;

        Ok(RawRecord {
            offset: reader.read_u32_le(offset)?,
            packed_size: reader.read_u32_le(offset + 4)?,
            unpacked_size: reader.read_u32_le(offset + 8)?,
            packed_type: reader.read_u24_le(offset + 12)?,
            fine_offset: reader.read_u8(offset + 15)?,
        })
    }
}

fn decode_byte_offsets(raw: RawRecord) -> std::result::Result<FileInfoRecord, Violation> {
    if raw.packed_size != raw.unpacked_size {
        return Err(Violation::SizeMismatch {
            packed: raw.packed_size,
            unpacked: raw.unpacked_size,
        });
    }

    if raw.packed_type != 0 {
        return Err(Violation::PackedType(raw.packed_type));
    }

    Ok(FileInfoRecord {
        data_offset: u64::from(raw.offset) + u64::from(raw.fine_offset),
        packed_size: raw.packed_size,
        unpacked_size: raw.unpacked_size,
        codec: Codec::Stored,
    })
}

fn decode_block_offsets(raw: RawRecord) -> FileInfoRecord {
    FileInfoRecord {
        data_offset: (u64::from(raw.offset) << 8) + u64::from(raw.fine_offset),
        packed_size: raw.packed_size,
        unpacked_size: raw.unpacked_size,
        codec: Codec::from_tag(raw.packed_type),
    }
}

/// Where one file's bytes live and how they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfoRecord {
    /// Absolute position of the data in the archive.
    pub data_offset: u64,

    /// Bytes occupied in the archive.
    pub packed_size: u32,

    /// Bytes after unpacking.
    pub unpacked_size: u32,

    pub codec: Codec,
}

impl FileInfoRecord {
    /// A file is packed exactly when its two sizes differ; the codec field
    /// alone doesn't decide it.
    #[inline(always)]
    pub fn is_packed(&self) -> bool {
        self.packed_size != self.unpacked_size
    }

    /// The stored bytes.
    pub fn data<'a>(&self, reader: &ByteReader<'a>) -> Result<&'a [u8]> {
        reader.read_bytes(self.data_offset, u64::from(self.packed_size))
    }
}

/// A resolved file: its path in the archive and the record describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: ArchivePath,
    pub record: FileInfoRecord,

    /// Index of the record in its table.
    pub index: u32,
}
