use byteorder::{ByteOrder, LittleEndian};

use crate::{
    error::{Error, Result, TrailingData},
    hashing::HashIndex,
    reader::ByteReader,
    record::{Entry, FileInfoRecord, Signature, FILE_INFO_STRIDE},
    tree::{DirectoryTreeWalker, LeafLookup, WalkedSlot, NAME_INFO_STRIDE},
};

/// Where the index tables of a `.DAT` sit, as computed when it was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatLayout {
    pub signature: Signature,

    /// Start of the file-info table header (the first word of the file).
    pub file_info_offset: u64,

    /// Second word of the file: bytes from the file-info table to the end.
    pub file_info_size: u32,

    /// First file-info record.
    pub records_offset: u64,
    pub file_count: u32,

    /// First name-info slot.
    pub name_info_offset: u64,
    pub name_count: u32,

    pub name_data_offset: u64,

    /// Start of the hash table region, after the name strings.
    pub name_crc_offset: u64,
    pub hash_count: usize,
}

/// An opened `.DAT` archive. All tables are located and validated by
/// [`DatArchive::parse`]; nothing is walked until asked for.
#[derive(Debug)]
pub struct DatArchive<'a> {
    reader: ByteReader<'a>,
    layout: DatLayout,
    lookup: LeafLookup,
}

impl<'a> DatArchive<'a> {
    pub fn parse(reader: ByteReader<'a>) -> Result<DatArchive<'a>> {
        let file_info_offset = u64::from(reader.read_u32_le(0)?);
        let file_info_size = reader.read_u32_le(4)?;

        let expected = file_info_offset + u64::from(file_info_size);
        if expected != reader.len() {
            return Err(Error::FileSizeMismatch {
                expected,
                actual: reader.len(),
            });
        }

        let tag = reader.read_i32_le(file_info_offset)?;
        let signature =
            Signature::from_tag(tag).ok_or(Error::UnrecognizedSignature { signature: tag })?;
        let file_count = reader.read_u32_le(file_info_offset + 4)?;
        let records_offset = file_info_offset + 8;

        let name_info_header = records_offset + u64::from(file_count) * FILE_INFO_STRIDE;
        let name_count = reader.read_u32_le(name_info_header)?;
        let name_info_offset = name_info_header + 4;

        let name_data_header = name_info_offset + u64::from(name_count) * NAME_INFO_STRIDE;
        let name_crc_relative = reader.read_u32_le(name_data_header)?;
        let name_data_offset = name_data_header + 4;
        let name_crc_offset = name_data_offset + u64::from(name_crc_relative);

        tracing::debug!(
            signature = tag,
            records = format_args!("{:#x}", records_offset),
            files = file_count,
            names = name_count,
            name_info = format_args!("{:#x}", name_info_offset),
            name_data = format_args!("{:#x}", name_data_offset),
            name_crc = format_args!("{:#x}", name_crc_offset),
            "located DAT tables"
        );

        let lookup = read_hash_region(&reader, name_crc_offset, file_count)?;

        let layout = DatLayout {
            signature,
            file_info_offset,
            file_info_size,
            records_offset,
            file_count,
            name_info_offset,
            name_count,
            name_data_offset,
            name_crc_offset,
            hash_count: lookup.hash_count(),
        };

        Ok(DatArchive {
            reader,
            layout,
            lookup,
        })
    }

    #[inline(always)]
    pub fn layout(&self) -> &DatLayout {
        &self.layout
    }

    #[inline(always)]
    pub fn reader(&self) -> ByteReader<'a> {
        self.reader
    }

    #[inline(always)]
    pub fn lookup(&self) -> &LeafLookup {
        &self.lookup
    }

    /// A fresh walk over the name-info table.
    pub fn walker(&self) -> DirectoryTreeWalker<'a> {
        DirectoryTreeWalker::new(
            self.reader,
            self.layout.name_info_offset,
            self.layout.name_count,
            self.layout.name_data_offset,
        )
    }

    pub fn record(&self, index: u32) -> Result<FileInfoRecord> {
        if index >= self.layout.file_count {
            return Err(Error::FileIdOutOfRange {
                id: index,
                count: self.layout.file_count,
            });
        }

        self.layout
            .signature
            .decode(&self.reader, self.layout.records_offset, index)
    }

    /// Resolves a walked slot to its file. Directories resolve to `None`.
    pub fn resolve(&self, slot: &WalkedSlot) -> Result<Option<Entry>> {
        let file_id = match slot.entry.file_id() {
            Some(id) => id,
            None => return Ok(None),
        };

        let index = self.lookup.file_index(&slot.path, file_id)?;
        let record = self.record(index)?;

        Ok(Some(Entry {
            path: slot.path.clone(),
            record,
            index,
        }))
    }

    /// Walks the whole tree and resolves every file, checking that each
    /// one's data lies inside the archive.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();

        for slot in self.walker() {
            if let Some(entry) = self.resolve(&slot?)? {
                entry.record.data(&self.reader)?;
                entries.push(entry);
            }
        }

        tracing::debug!(files = entries.len(), "resolved DAT entries");
        Ok(entries)
    }
}

/// Reads the optional path hash table and checks the region ends with a
/// zero terminator and nothing after it.
///
/// A region starting exactly at end of file has neither.
fn read_hash_region(reader: &ByteReader<'_>, offset: u64, file_count: u32) -> Result<LeafLookup> {
    if offset == reader.len() {
        tracing::debug!("no hash region");
        return Ok(LeafLookup::ByIndex);
    }

    let first = reader.read_u32_le(offset)?;
    let (lookup, end) = if first == 0 {
        (LeafLookup::ByIndex, offset + 4)
    } else {
        let count = u64::from(file_count.max(1));
        let table = reader.read_bytes(offset, count * 4)?;
        let index = HashIndex::from_hashes(table.chunks_exact(4).map(LittleEndian::read_u32));

        tracing::debug!(
            start = format_args!("{:#x}", offset),
            hashes = index.len(),
            "read hash table"
        );

        (LeafLookup::ByHash(index), offset + count * 4)
    };

    let terminator = reader.read_u64_le(end)?;
    if terminator != 0 {
        return Err(Error::TrailingDataInvalid {
            offset: end,
            found: TrailingData::NonZeroTerminator(terminator),
        });
    }

    let end = end + 8;
    if end != reader.len() {
        return Err(Error::TrailingDataInvalid {
            offset: end,
            found: TrailingData::ExtraBytes(reader.len() - end),
        });
    }

    Ok(lookup)
}
