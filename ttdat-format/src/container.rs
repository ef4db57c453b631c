use std::path::Path;

use crate::{
    dat::DatArchive,
    error::Result,
    extract::{extract_entries, ExtractOptions, ExtractProgress, ExtractStats},
    fpk::FpkArchive,
    header::ContainerKind,
    reader::ByteReader,
    record::Entry,
};

/// Either archive flavour, chosen by the file's leading word.
#[derive(Debug)]
pub enum Container<'a> {
    Dat(DatArchive<'a>),
    Fpk(FpkArchive<'a>),
}

impl<'a> Container<'a> {
    pub fn detect(reader: &ByteReader<'_>) -> Result<ContainerKind> {
        ContainerKind::detect(reader)
    }

    pub fn parse(reader: ByteReader<'a>) -> Result<Container<'a>> {
        match ContainerKind::detect(&reader)? {
            ContainerKind::Fpk => FpkArchive::parse(reader).map(Container::Fpk),
            ContainerKind::Dat { .. } => DatArchive::parse(reader).map(Container::Dat),
        }
    }

    pub fn reader(&self) -> ByteReader<'a> {
        match self {
            Container::Dat(dat) => dat.reader(),
            Container::Fpk(fpk) => fpk.reader(),
        }
    }

    /// Every file in the archive, fully resolved.
    pub fn entries(&self) -> Result<Vec<Entry>> {
        match self {
            Container::Dat(dat) => dat.entries(),
            Container::Fpk(fpk) => fpk.entries(),
        }
    }

    /// Resolves every entry, then writes them beneath `dest`. A resolution
    /// failure means nothing is written.
    pub fn extract_all<P, F>(
        &self,
        dest: P,
        options: &ExtractOptions,
        progress: F,
    ) -> Result<ExtractStats>
    where
        P: AsRef<Path>,
        F: FnMut(ExtractProgress<'_>),
    {
        let entries = self.entries()?;
        extract_entries(&self.reader(), &entries, dest.as_ref(), options, progress)
    }
}
