use relative_path::RelativePathBuf;
use std::{
    fmt,
    path::{Path, PathBuf},
};

#[cfg(not(windows))]
/// The platform-specific separator as a string, used for printing
/// `ArchivePath`s in the platform-preferred manner.
pub const PATH_PLATFORM_SEP: &str = "/";

#[cfg(windows)]
/// The platform-specific separator as a string, used for printing
/// `ArchivePath`s in the platform-preferred manner.
pub const PATH_PLATFORM_SEP: &str = "\\";

/// The separator archives store between path components.
pub const PATH_ARCHIVE_SEP: char = '\\';

/// A path as spelled inside an archive, e.g. `\ASSETS\a.txt`.
///
/// The string is kept exactly as reconstructed from the name table, leading
/// separator included, since that is what name hashes are computed over.
#[derive(Debug, Clone, Default, PartialOrd, Ord, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ArchivePath(pub(crate) String);

impl ArchivePath {
    pub fn new<S: Into<String>>(path: S) -> ArchivePath {
        ArchivePath(path.into())
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends `\name`. An empty name leaves the path untouched so a blank
    /// root entry doesn't produce a doubled separator.
    pub fn join_name(&self, name: &str) -> ArchivePath {
        if name.is_empty() {
            return self.clone();
        }

        let mut out = String::with_capacity(self.0.len() + 1 + name.len());
        out.push_str(&self.0);
        out.push(PATH_ARCHIVE_SEP);
        out.push_str(name);
        ArchivePath(out)
    }

    /// Non-empty components. `.` and `..` are dropped so that an entry can
    /// never be written outside the output directory.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(|c: char| c == PATH_ARCHIVE_SEP || c == '/')
            .filter(|c| !c.is_empty() && *c != "." && *c != "..")
    }

    pub fn filename(&self) -> Option<&str> {
        self.iter().last()
    }

    pub fn to_relative_path(&self) -> RelativePathBuf {
        let mut out = RelativePathBuf::new();
        for component in self.iter() {
            out.push(component);
        }
        out.normalize()
    }

    /// Where this entry lands beneath `root`.
    pub fn to_path<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        self.to_relative_path().to_path(root)
    }
}

impl From<&str> for ArchivePath {
    fn from(path: &str) -> Self {
        ArchivePath::new(path)
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.iter();
        if let Some(v) = iter.next() {
            f.write_str(v)?;
        }
        for v in iter {
            f.write_str(PATH_PLATFORM_SEP)?;
            f.write_str(v)?;
        }
        Ok(())
    }
}
