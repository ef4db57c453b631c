//! Rebuilds the folder hierarchy from the name-info table.
//!
//! Each 8-byte slot is `kind: i16, path_ref: i16, name_offset: u32`. There
//! are no parent pointers: a slot either continues from the most recently
//! entered directory or names an earlier slot whose resolved path it
//! extends.

use crate::{
    error::{Error, Result},
    hashing::{hash_name, HashIndex},
    path::ArchivePath,
    reader::ByteReader,
};

/// Size of one name-info slot.
pub const NAME_INFO_STRIDE: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A folder. The stored value is the index of the folder's last item.
    Directory { last_item: i16 },
    File { file_id: u32 },
}

/// One decoded name-info slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: SlotKind,

    /// Earlier slot whose path this one starts from.
    pub path_ref: Option<u16>,

    /// Offset of the name relative to the start of the name data.
    pub name_offset: u32,
}

impl TreeEntry {
    pub fn read(reader: &ByteReader<'_>, offset: u64) -> Result<TreeEntry> {
        let kind = reader.read_u16_le_signed(offset)?;
        let path_ref = reader.read_u16_le_signed(offset + 2)?;
        let name_offset = reader.read_u32_le(offset + 4)?;

        let kind = if kind > 0 {
            SlotKind::Directory { last_item: kind }
        } else {
            SlotKind::File {
                file_id: (-i32::from(kind)) as u32,
            }
        };

        let path_ref = if path_ref > 0 {
            Some(path_ref as u16)
        } else {
            None
        };

        Ok(TreeEntry {
            kind,
            path_ref,
            name_offset,
        })
    }

    #[inline(always)]
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, SlotKind::Directory { .. })
    }

    #[inline(always)]
    pub fn file_id(&self) -> Option<u32> {
        match self.kind {
            SlotKind::File { file_id } => Some(file_id),
            SlotKind::Directory { .. } => None,
        }
    }
}

/// State carried from slot to slot during one walk.
///
/// Resolved paths are append-only and indexed by slot, so a back-reference
/// can only ever name something already resolved.
#[derive(Debug, Clone, Default)]
pub struct PathAccumulator {
    current_directory: ArchivePath,
    resolved: Vec<ArchivePath>,
    last_item_offset: i16,
}

impl PathAccumulator {
    pub fn new() -> PathAccumulator {
        PathAccumulator::default()
    }

    pub fn current_directory(&self) -> &ArchivePath {
        &self.current_directory
    }

    /// Last-item marker of the most recent directory. Nothing reads it back.
    pub fn last_item_offset(&self) -> i16 {
        self.last_item_offset
    }

    pub fn resolved(&self, slot: u16) -> Option<&ArchivePath> {
        self.resolved.get(usize::from(slot))
    }

    /// Resolves the next slot. Slots must arrive in table order.
    pub fn push(&mut self, entry: &TreeEntry, name: &str) -> Result<ArchivePath> {
        let slot = self.resolved.len() as u32;

        let path = match entry.path_ref {
            Some(reference) => self
                .resolved(reference)
                .ok_or_else(|| Error::DanglingBackReference { slot, reference })?
                .join_name(name),
            None => self.current_directory.join_name(name),
        };

        if let SlotKind::Directory { last_item } = entry.kind {
            self.last_item_offset = last_item;
            if !path.is_empty() {
                self.current_directory = path.clone();
            }
        }

        self.resolved.push(path.clone());
        Ok(path)
    }
}

/// A slot with its name and full path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedSlot {
    pub index: u32,
    pub entry: TreeEntry,
    pub name: String,
    pub path: ArchivePath,
}

/// How leaves are matched to file-info records, decided once per archive.
#[derive(Debug, Clone)]
pub enum LeafLookup {
    /// The archive carries a path hash table.
    ByHash(HashIndex),
    /// The slot's file id is the record index.
    ByIndex,
}

impl LeafLookup {
    pub fn file_index(&self, path: &ArchivePath, file_id: u32) -> Result<u32> {
        match self {
            LeafLookup::ByIndex => Ok(file_id),
            LeafLookup::ByHash(index) => {
                let hash = hash_name(path.as_str());
                index.get(hash).ok_or_else(|| Error::UnknownFileHash {
                    hash,
                    path: path.as_str().to_string(),
                })
            }
        }
    }

    pub fn hash_count(&self) -> usize {
        match self {
            LeafLookup::ByHash(index) => index.len(),
            LeafLookup::ByIndex => 0,
        }
    }
}

/// Iterates the name-info table in slot order, yielding every slot with its
/// resolved path. Stops after the first error.
#[derive(Debug)]
pub struct DirectoryTreeWalker<'a> {
    reader: ByteReader<'a>,
    slots_offset: u64,
    name_data_offset: u64,
    count: u32,
    next: u32,
    state: PathAccumulator,
    failed: bool,
}

impl<'a> DirectoryTreeWalker<'a> {
    pub fn new(
        reader: ByteReader<'a>,
        slots_offset: u64,
        count: u32,
        name_data_offset: u64,
    ) -> DirectoryTreeWalker<'a> {
        DirectoryTreeWalker {
            reader,
            slots_offset,
            name_data_offset,
            count,
            next: 0,
            state: PathAccumulator::new(),
            failed: false,
        }
    }

    pub fn state(&self) -> &PathAccumulator {
        &self.state
    }

    fn walk_slot(&mut self, index: u32) -> Result<WalkedSlot> {
        let offset = self.slots_offset + u64::from(index) * NAME_INFO_STRIDE;
        let entry = TreeEntry::read(&self.reader, offset)?;
        let name = self
            .reader
            .read_cstring(self.name_data_offset + u64::from(entry.name_offset))?;
        let path = self.state.push(&entry, &name)?;

        tracing::trace!(
            slot = index,
            offset = format_args!("{:#x}", offset),
            directory = entry.is_directory(),
            path = path.as_str(),
            "walked name slot"
        );

        Ok(WalkedSlot {
            index,
            entry,
            name,
            path,
        })
    }
}

impl<'a> Iterator for DirectoryTreeWalker<'a> {
    type Item = Result<WalkedSlot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.count {
            return None;
        }

        let index = self.next;
        self.next += 1;

        let slot = self.walk_slot(index);
        self.failed = slot.is_err();
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = (self.count - self.next) as usize;
        (0, Some(remaining))
    }
}

impl<'a> std::iter::FusedIterator for DirectoryTreeWalker<'a> {}
