use std::path::PathBuf;

use crate::compression::Codec;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way an archive can fail to open or extract. None of these are
/// recoverable for the archive in question.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read of {len:#x} bytes at {offset:#x} runs past the end of the archive ({size:#x} bytes)")]
    TruncatedArchive { offset: u64, len: u64, size: u64 },

    #[error("not a recognized .DAT or .FPK file (first word {first_word:#010x}, size {size:#x})")]
    UnrecognizedContainer { first_word: u32, size: u64 },

    #[error("file info signature {signature} invalid")]
    UnrecognizedSignature { signature: i32 },

    #[error("file size mismatch (expected {expected:#x}, got {actual:#x})")]
    FileSizeMismatch { expected: u64, actual: u64 },

    #[error("{violation} (file {index}, record at {offset:#x})")]
    FormatInvariantViolation {
        index: u32,
        offset: u64,
        violation: Violation,
    },

    #[error("hash {hash:#010x} of `{path}` doesn't correspond to a file")]
    UnknownFileHash { hash: u32, path: String },

    #[error("{found} at {offset:#x}")]
    TrailingDataInvalid { offset: u64, found: TrailingData },

    #[error("name slot {slot} refers to slot {reference}, which has not been resolved")]
    DanglingBackReference { slot: u32, reference: u16 },

    #[error("file id {id} is out of range ({count} files)")]
    FileIdOutOfRange { id: u32, count: u32 },

    #[error("cannot unpack entry at {offset:#x}")]
    Codec {
        offset: u64,
        #[source]
        source: CodecError,
    },

    #[error("cannot write `{}`", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Record-level constraints a file-info or FPK entry broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("packed size {packed:#x} differs from unpacked size {unpacked:#x}")]
    SizeMismatch { packed: u32, unpacked: u32 },

    #[error("packed type {0} is not 0")]
    PackedType(u32),

    #[error("expected entry marker 16 but got {0}")]
    EntryMarker(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrailingData {
    #[error("unexpected non-zero terminator {0:#018x}")]
    NonZeroTerminator(u64),

    #[error("{0:#x} unexpected bytes past the end of the hash table")]
    ExtraBytes(u64),
}

/// Failures of the LZ2K codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("bad chunk magic {found:02x?} at input offset {offset:#x}")]
    BadChunkMagic { offset: usize, found: [u8; 4] },

    #[error("chunk header at input offset {offset:#x} is truncated")]
    TruncatedChunk { offset: usize },

    #[error("malformed huffman table: {0}")]
    BadTable(&'static str),

    #[error("match distance {distance} reaches before the {produced} bytes produced so far")]
    BadDistance { distance: usize, produced: usize },

    #[error("output overrun: {wanted} bytes wanted, room for {size}")]
    OutputOverrun { wanted: usize, size: usize },

    #[error("input overrun: {consumed} bytes needed, {available} available")]
    InputOverrun { consumed: usize, available: usize },

    #[error("size mismatch: produced {produced} bytes, expected {expected}")]
    SizeMismatch { produced: usize, expected: usize },

    #[error("cannot handle compression {0}")]
    Unsupported(Codec),
}

/// Stable names for the error taxonomy, independent of the values carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TruncatedArchive,
    UnrecognizedContainer,
    UnrecognizedSignature,
    FileSizeMismatch,
    FormatInvariantViolation,
    UnknownFileHash,
    TrailingDataInvalid,
    DanglingBackReference,
    FileIdOutOfRange,
    CodecError,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TruncatedArchive { .. } => ErrorKind::TruncatedArchive,
            Error::UnrecognizedContainer { .. } => ErrorKind::UnrecognizedContainer,
            Error::UnrecognizedSignature { .. } => ErrorKind::UnrecognizedSignature,
            Error::FileSizeMismatch { .. } => ErrorKind::FileSizeMismatch,
            Error::FormatInvariantViolation { .. } => ErrorKind::FormatInvariantViolation,
            Error::UnknownFileHash { .. } => ErrorKind::UnknownFileHash,
            Error::TrailingDataInvalid { .. } => ErrorKind::TrailingDataInvalid,
            Error::DanglingBackReference { .. } => ErrorKind::DanglingBackReference,
            Error::FileIdOutOfRange { .. } => ErrorKind::FileIdOutOfRange,
            Error::Codec { .. } => ErrorKind::CodecError,
            Error::Output { .. } | Error::Io(_) => ErrorKind::Io,
        }
    }
}
