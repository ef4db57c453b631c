use std::path::PathBuf;

use ttdat_format::CodecError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open archive `{}`", .path.display())]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: ttdat_format::Error,
    },

    #[error("Cannot extract `{}`", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: ttdat_format::Error,
    },

    #[error("Cannot read file `{}`", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write file `{}`", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot unpack `{}`", .path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}
