use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use comde::{stored::StoredDecompressor, Decompressor};

use crate::{
    compression::Codec,
    error::{CodecError, Error, Result},
    reader::ByteReader,
    record::Entry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Unpack compressed entries. When off, packed bytes are written as is.
    pub unpack: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions { unpack: true }
    }
}

/// Events reported while extracting, in order.
#[derive(Debug)]
pub enum ExtractProgress<'a> {
    Started {
        total_files: usize,
    },
    Extracting {
        entry: &'a Entry,
        destination: &'a Path,
    },
    Extracted {
        entry: &'a Entry,
        files_extracted: usize,
    },
    Finished,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub files_extracted: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,

    /// Packed entries written raw because their codec isn't supported.
    pub raw_fallbacks: usize,
}

/// Writes every entry beneath `dest`, creating directories as needed.
pub(crate) fn extract_entries<F>(
    reader: &ByteReader<'_>,
    entries: &[Entry],
    dest: &Path,
    options: &ExtractOptions,
    mut progress: F,
) -> Result<ExtractStats>
where
    F: FnMut(ExtractProgress<'_>),
{
    let mut stats = ExtractStats::default();
    progress(ExtractProgress::Started {
        total_files: entries.len(),
    });

    for entry in entries {
        let destination = entry.path.to_path(dest);
        progress(ExtractProgress::Extracting {
            entry,
            destination: &destination,
        });

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(output_error(parent))?;
        }

        let data = entry.record.data(reader)?;
        let written = write_entry(entry, data, &destination, options, &mut stats)?;

        stats.files_extracted += 1;
        stats.bytes_read += data.len() as u64;
        stats.bytes_written += written;

        progress(ExtractProgress::Extracted {
            entry,
            files_extracted: stats.files_extracted,
        });
    }

    progress(ExtractProgress::Finished);
    Ok(stats)
}

fn write_entry(
    entry: &Entry,
    data: &[u8],
    destination: &Path,
    options: &ExtractOptions,
    stats: &mut ExtractStats,
) -> Result<u64> {
    let record = &entry.record;
    let file = File::create(destination).map_err(output_error(destination))?;
    let mut out = BufWriter::new(file);

    let unpacked = if options.unpack && record.is_packed() {
        let unpacked = unpack(entry, data)?;
        if unpacked.is_none() {
            tracing::warn!(
                path = entry.path.as_str(),
                codec = %record.codec,
                "unknown packed type, writing raw data"
            );
            stats.raw_fallbacks += 1;
        }
        unpacked
    } else {
        None
    };

    let written = match unpacked {
        Some(bytes) => {
            out.write_all(&bytes).map_err(output_error(destination))?;
            bytes.len() as u64
        }
        None => {
            StoredDecompressor
                .copy(data, &mut out)
                .map_err(output_error(destination))?;
            data.len() as u64
        }
    };

    out.flush().map_err(output_error(destination))?;
    Ok(written)
}

/// Unpacked bytes, or `None` when the codec can't be handled here.
fn unpack(entry: &Entry, data: &[u8]) -> Result<Option<Vec<u8>>> {
    let record = &entry.record;

    match record.codec {
        Codec::Stored => Ok(None),
        codec => match codec.decompress(data, Some(record.unpacked_size)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(CodecError::Unsupported(_)) => Ok(None),
            Err(source) => Err(Error::Codec {
                offset: record.data_offset,
                source,
            }),
        },
    }
}

fn output_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error {
    let path: PathBuf = path.to_path_buf();
    move |source| Error::Output { path, source }
}
