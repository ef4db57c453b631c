//! Path hashing for archives that address files by name rather than by id.

use std::collections::HashMap;

/// The 32-bit FNV offset basis.
pub const FNV_BASIS: u32 = 2_166_136_261;

/// Archives are hashed with this multiplier, not the FNV prime (16777619).
pub const FNV_MULTIPLIER: u32 = 1_677_619;

const SEP: char = '\\';

/// Drops one leading separator and upper-cases ASCII letters.
pub fn normalize_name(path: &str) -> String {
    path.strip_prefix(SEP).unwrap_or(path).to_ascii_uppercase()
}

/// Hashes an archive path (`\FOLDER\file.ext`) the way the hash table stores it.
pub fn hash_name(path: &str) -> u32 {
    normalize_name(path)
        .chars()
        .fold(FNV_BASIS, |hash, c| (hash ^ c as u32).wrapping_mul(FNV_MULTIPLIER))
}

/// Maps a path hash to the file-info record it names.
///
/// Built once when the archive is opened; the position of a hash in the
/// on-disk table is the record index.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    indices: HashMap<u32, u32>,
}

impl HashIndex {
    pub fn from_hashes<I: IntoIterator<Item = u32>>(hashes: I) -> HashIndex {
        let mut indices = HashMap::new();
        for (index, hash) in hashes.into_iter().enumerate() {
            indices.insert(hash, index as u32);
        }
        HashIndex { indices }
    }

    #[inline(always)]
    pub fn get(&self, hash: u32) -> Option<u32> {
        self.indices.get(&hash).copied()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
