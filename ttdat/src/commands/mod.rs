pub mod extract;
pub mod unpack;

pub use extract::run as extract;
pub use unpack::run as unpack;
pub use unpack::UnpackArgs;

use humansize::{file_size_opts as options, FileSize};

/// `1.5 MB`-style sizes for summaries.
pub(crate) fn human_size(bytes: u64) -> String {
    bytes
        .file_size(options::CONVENTIONAL)
        .unwrap_or_else(|_| format!("{} B", bytes))
}
