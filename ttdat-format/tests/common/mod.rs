//! Builds synthetic `.DAT` and `.FPK` archives for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use ttdat_format::hash_name;

/// The hash region that follows the name strings.
#[derive(Debug, Clone)]
pub enum HashRegion {
    /// Zero first word, then the terminator.
    Absent,
    /// Hashes in record order, then the terminator.
    Hashes(Vec<u32>),
    /// Nothing at all after the names.
    Missing,
}

/// Lays out `header | data | file info | name info | names | hashes`.
#[derive(Debug, Clone)]
pub struct DatBuilder {
    signature: i32,
    data: Vec<u8>,
    records: Vec<[u8; 16]>,
    slots: Vec<[u8; 8]>,
    names: Vec<u8>,
    hashes: HashRegion,
    trailing: Vec<u8>,
    size_delta: i64,
}

impl DatBuilder {
    pub fn new(signature: i32) -> DatBuilder {
        DatBuilder {
            signature,
            data: Vec::new(),
            records: Vec::new(),
            slots: Vec::new(),
            // Offset 0 is the blank name.
            names: vec![0],
            hashes: HashRegion::Absent,
            trailing: Vec::new(),
            size_delta: 0,
        }
    }

    /// Appends file data, returning its absolute offset.
    pub fn add_data(&mut self, bytes: &[u8]) -> u32 {
        let offset = 8 + self.data.len() as u32;
        self.data.extend_from_slice(bytes);
        offset
    }

    /// A record in this archive's signature layout, pointing at `offset`.
    pub fn add_record(&mut self, offset: u32, packed: u32, unpacked: u32, packed_type: u32) -> u32 {
        let (coarse, fine) = match self.signature {
            -3 => (offset >> 8, (offset & 0xff) as u8),
            _ => (offset, 0),
        };
        self.add_raw_record(coarse, packed, unpacked, packed_type, fine)
    }

    pub fn add_raw_record(
        &mut self,
        offset: u32,
        packed: u32,
        unpacked: u32,
        packed_type: u32,
        fine: u8,
    ) -> u32 {
        let mut record = [0u8; 16];
        record[0..4].copy_from_slice(&offset.to_le_bytes());
        record[4..8].copy_from_slice(&packed.to_le_bytes());
        record[8..12].copy_from_slice(&unpacked.to_le_bytes());
        record[12..15].copy_from_slice(&packed_type.to_le_bytes()[..3]);
        record[15] = fine;

        self.records.push(record);
        self.records.len() as u32 - 1
    }

    /// Stores `bytes` as an unpacked file, returning its record index.
    pub fn add_file(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.add_data(bytes);
        let len = bytes.len() as u32;
        self.add_record(offset, len, len, 0)
    }

    pub fn add_packed(&mut self, bytes: &[u8], unpacked: u32, packed_type: u32) -> u32 {
        let offset = self.add_data(bytes);
        self.add_record(offset, bytes.len() as u32, unpacked, packed_type)
    }

    fn name(&mut self, name: &str) -> u32 {
        if name.is_empty() {
            return 0;
        }
        let offset = self.names.len() as u32;
        self.names.extend_from_slice(name.as_bytes());
        self.names.push(0);
        offset
    }

    fn slot(&mut self, kind: i16, path_ref: i16, name: &str) -> u16 {
        let name_offset = self.name(name);
        let mut slot = [0u8; 8];
        slot[0..2].copy_from_slice(&kind.to_le_bytes());
        slot[2..4].copy_from_slice(&path_ref.to_le_bytes());
        slot[4..8].copy_from_slice(&name_offset.to_le_bytes());

        self.slots.push(slot);
        self.slots.len() as u16 - 1
    }

    /// A directory slot continuing from the current directory.
    pub fn dir(&mut self, name: &str) -> u16 {
        let last = self.slots.len() as i16 + 1;
        self.slot(last, 0, name)
    }

    /// A directory slot starting from an earlier slot's path.
    pub fn dir_from(&mut self, parent: u16, name: &str) -> u16 {
        let last = self.slots.len() as i16 + 1;
        self.slot(last, parent as i16, name)
    }

    pub fn file(&mut self, name: &str, file_id: u32) -> u16 {
        self.slot(-(file_id as i16), 0, name)
    }

    pub fn file_from(&mut self, parent: u16, name: &str, file_id: u32) -> u16 {
        self.slot(-(file_id as i16), parent as i16, name)
    }

    /// Hash table over `paths`, one per record in record order.
    pub fn with_hashes(&mut self, paths: &[&str]) -> &mut Self {
        self.hashes = HashRegion::Hashes(paths.iter().map(|p| hash_name(p)).collect());
        self
    }

    pub fn with_hash_region(&mut self, hashes: HashRegion) -> &mut Self {
        self.hashes = hashes;
        self
    }

    pub fn with_trailing(&mut self, bytes: &[u8]) -> &mut Self {
        self.trailing = bytes.to_vec();
        self
    }

    /// Skews the declared file-info size.
    pub fn with_size_delta(&mut self, delta: i64) -> &mut Self {
        self.size_delta = delta;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0u8; 8];
        out.extend_from_slice(&self.data);

        let file_info_offset = out.len() as u32;
        out.extend_from_slice(&self.signature.to_le_bytes());
        out.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
        for record in &self.records {
            out.extend_from_slice(record);
        }

        out.extend_from_slice(&(self.slots.len() as u32).to_le_bytes());
        for slot in &self.slots {
            out.extend_from_slice(slot);
        }

        out.extend_from_slice(&(self.names.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.names);

        match &self.hashes {
            HashRegion::Absent => out.extend_from_slice(&[0; 12]),
            HashRegion::Hashes(hashes) => {
                for hash in hashes {
                    out.extend_from_slice(&hash.to_le_bytes());
                }
                out.extend_from_slice(&[0; 8]);
            }
            HashRegion::Missing => {}
        }

        out.extend_from_slice(&self.trailing);

        let file_info_size = (out.len() as i64 - i64::from(file_info_offset) + self.size_delta) as u32;
        out[0..4].copy_from_slice(&file_info_offset.to_le_bytes());
        out[4..8].copy_from_slice(&file_info_size.to_le_bytes());
        out
    }
}

/// The archive from the basic extraction scenario: `ASSETS\a.txt` plus a
/// second file at the root of `ASSETS`.
pub fn assets_archive() -> DatBuilder {
    let mut dat = DatBuilder::new(-1);
    let a = dat.add_file(b"hello from a.txt\n");
    let b = dat.add_file(b"\x00\x01\x02\x03binary");

    dat.dir("");
    dat.dir("ASSETS");
    dat.file("a.txt", a);
    dat.file("b.bin", b);
    dat
}

/// An LZ2K chunk holding `ABBA`.
pub fn lz2k_abba() -> Vec<u8> {
    let payload = [0x00, 0x04, 0x20, 0x04, 0x24, 0x30, 0xb7, 0x00, 0x60];
    let mut out = b"LZ2K".to_vec();
    out.extend_from_slice(&4u32.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Builds a flat `.FPK` from `(name, data)` pairs.
pub fn fpk(files: &[(&str, &[u8])]) -> Vec<u8> {
    let header_len = 12 + 28 * files.len();
    let mut names = Vec::new();
    let mut data = Vec::new();
    let mut table = Vec::new();

    let names_len: usize = files.iter().map(|(name, _)| name.len() + 1).sum();
    for (name, bytes) in files {
        let name_offset = header_len + names.len();
        let data_offset = header_len + names_len + data.len();
        names.extend_from_slice(name.as_bytes());
        names.push(0);
        data.extend_from_slice(bytes);

        table.extend_from_slice(&(name_offset as u32).to_le_bytes());
        table.extend_from_slice(&(data_offset as u32).to_le_bytes());
        table.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        table.extend_from_slice(&16u32.to_le_bytes());
        table.extend_from_slice(&[0; 12]);
    }

    let total = header_len + names.len() + data.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&0x1234_5678u32.to_le_bytes());
    out.extend_from_slice(&(files.len() as u32).to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend(table);
    out.extend(names);
    out.extend(data);
    out
}

/// Writes `bytes` as `name` in a fresh temporary directory.
pub fn write_archive(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}

/// Every file below `root`, relative to it with `/` separators, sorted.
pub fn tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                let name = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push((name, std::fs::read(&path).unwrap()));
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
