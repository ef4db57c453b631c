use crate::{
    compression::Codec,
    error::{Error, Result, Violation},
    header::FPK_MAGIC,
    path::ArchivePath,
    reader::ByteReader,
    record::{Entry, FileInfoRecord},
};

const FPK_HEADER_LEN: u64 = 12;
const FPK_ENTRY_STRIDE: u64 = 28;
const FPK_ENTRY_MARKER: u32 = 16;

/// A flat `.FPK` archive: a counted table of
/// `{name_offset, data_offset, size, 16, reserved[12]}` entries with no
/// hierarchy and no compression.
#[derive(Debug)]
pub struct FpkArchive<'a> {
    reader: ByteReader<'a>,
    file_count: u32,
}

impl<'a> FpkArchive<'a> {
    pub fn parse(reader: ByteReader<'a>) -> Result<FpkArchive<'a>> {
        let magic = reader.read_u32_le(0)?;
        if magic != FPK_MAGIC {
            return Err(Error::UnrecognizedContainer {
                first_word: magic,
                size: reader.len(),
            });
        }

        let file_count = reader.read_u32_le(4)?;
        let expected = u64::from(reader.read_u32_le(8)?);
        if expected != reader.len() {
            return Err(Error::FileSizeMismatch {
                expected,
                actual: reader.len(),
            });
        }

        tracing::debug!(files = file_count, "opened FPK");

        Ok(FpkArchive { reader, file_count })
    }

    #[inline(always)]
    pub fn file_count(&self) -> u32 {
        self.file_count
    }

    #[inline(always)]
    pub fn reader(&self) -> ByteReader<'a> {
        self.reader
    }

    pub fn entry(&self, index: u32) -> Result<Entry> {
        let offset = FPK_HEADER_LEN + u64::from(index) * FPK_ENTRY_STRIDE;
        self.reader.read_bytes(offset, FPK_ENTRY_STRIDE)?;

        let name_offset = self.reader.read_u32_le(offset)?;
        let data_offset = self.reader.read_u32_le(offset + 4)?;
        let size = self.reader.read_u32_le(offset + 8)?;
        let marker = self.reader.read_u32_le(offset + 12)?;

        if marker != FPK_ENTRY_MARKER {
            return Err(Error::FormatInvariantViolation {
                index,
                offset,
                violation: Violation::EntryMarker(marker),
            });
        }

        let name = self.reader.read_cstring(u64::from(name_offset))?;

        Ok(Entry {
            path: ArchivePath::new(name),
            record: FileInfoRecord {
                data_offset: u64::from(data_offset),
                packed_size: size,
                unpacked_size: size,
                codec: Codec::Stored,
            },
            index,
        })
    }

    /// Every entry, with each one's data checked to lie inside the archive.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        (0..self.file_count)
            .map(|index| {
                let entry = self.entry(index)?;
                entry.record.data(&self.reader)?;
                Ok(entry)
            })
            .collect()
    }
}
