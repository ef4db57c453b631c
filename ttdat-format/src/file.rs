use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

use crate::{
    container::Container,
    error::{Error, Result},
    reader::ByteReader,
};

/// An archive on disk, mapped into memory for random access.
#[derive(Debug)]
pub struct ArchiveFile {
    path: PathBuf,
    mmap: Mmap,
}

impl ArchiveFile {
    /// Opens and maps `path`. An empty file can't be any archive and is
    /// rejected here, before mapping.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ArchiveFile> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).open(path)?;
        let size = file.metadata()?.len();

        if size == 0 {
            return Err(Error::TruncatedArchive {
                offset: 0,
                len: 4,
                size,
            });
        }

        // Safety: mapped read-only; the file must not shrink while mapped.
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        tracing::debug!(path = %path.display(), size, "mapped archive");

        Ok(ArchiveFile {
            path: path.to_path_buf(),
            mmap,
        })
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    #[inline(always)]
    pub fn reader(&self) -> ByteReader<'_> {
        ByteReader::new(&self.mmap)
    }

    pub fn container(&self) -> Result<Container<'_>> {
        Container::parse(self.reader())
    }

    /// The archive's file name without its extension.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("archive")
    }

    /// Where extraction goes by default: a directory named after the
    /// archive, in the current directory.
    pub fn default_output_dir(&self) -> PathBuf {
        PathBuf::from(self.stem())
    }
}
