//! Reader for Traveller's Tales `.DAT` and `.FPK` asset archives.
//!
//! A `.DAT` archive stores its file data up front and three index tables at
//! the end: fixed-stride file-info records, an 8-byte-per-slot name tree and
//! the name strings, optionally followed by a table of path hashes. This crate
//! rebuilds the folder hierarchy from those tables and extracts each file,
//! unpacking LZ2K-compressed entries on the way.

mod compression;
mod container;
mod dat;
mod error;
mod extract;
mod file;
mod fpk;
mod hashing;
mod header;
pub mod path;
mod reader;
mod record;
mod tree;

#[cfg(feature = "lz2k")]
pub use compression::lz2k;
pub use compression::Codec;
pub use container::Container;
pub use dat::{DatArchive, DatLayout};
pub use error::{CodecError, Error, ErrorKind, Result, TrailingData, Violation};
pub use extract::{ExtractOptions, ExtractProgress, ExtractStats};
pub use file::ArchiveFile;
pub use fpk::FpkArchive;
pub use hashing::{hash_name, normalize_name, HashIndex, FNV_BASIS, FNV_MULTIPLIER};
pub use header::{ContainerKind, FPK_MAGIC};
pub use path::ArchivePath;
pub use reader::ByteReader;
pub use record::{Entry, FileInfoRecord, Signature, FILE_INFO_STRIDE};
pub use tree::{DirectoryTreeWalker, LeafLookup, PathAccumulator, SlotKind, TreeEntry, WalkedSlot};
