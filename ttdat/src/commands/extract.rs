use std::path::{Path, PathBuf};

use ttdat_format::{
    ArchiveFile, Container, DatLayout, Entry, ExtractOptions, ExtractProgress, ExtractStats,
};

use super::human_size;
use crate::error::{Error, Result};

pub fn run(path: PathBuf, directory: Option<PathBuf>, unpack: bool) -> Result<()> {
    let open_error = |source| Error::OpenArchive {
        path: path.clone(),
        source,
    };

    let archive = ArchiveFile::open(&path).map_err(open_error)?;
    let container = archive.container().map_err(open_error)?;
    let output_path = directory.unwrap_or_else(|| archive.default_output_dir());

    let is_dat = match &container {
        Container::Dat(dat) => {
            print_layout(dat.layout());
            true
        }
        Container::Fpk(fpk) => {
            tracing::info!(files = fpk.file_count(), "FPK archive");
            false
        }
    };

    let options = ExtractOptions { unpack };
    let stats = container
        .extract_all(&output_path, &options, |progress| {
            if let ExtractProgress::Extracting { entry, destination } = progress {
                print_entry(is_dat, entry, destination);
            }
        })
        .map_err(|source| Error::Extract {
            path: path.clone(),
            source,
        })?;

    print_summary(&stats, &output_path);
    Ok(())
}

fn print_layout(layout: &DatLayout) {
    println!("DAT file with signature: {}", layout.signature.tag());
    println!("File info offset: {:<8X}", layout.records_offset);
    println!("File info size: {:<8X}", layout.file_info_size);
    println!("Number of files: {}", layout.file_count);
    println!("Name info offset: {:<8X}", layout.name_info_offset);
    println!("Number of names: {}", layout.name_count);
    println!("Name data offset: {:<8X}", layout.name_data_offset);
    println!("Name CRC offset: {:<8X}", layout.name_crc_offset);
    println!("Number of CRCs: {}\n", layout.hash_count);
    println!("Offset  \tPacked  \tUnpacked\tAlg?\tFile");
    println!("{}", "-".repeat(100));
}

#[inline(always)]
fn print_entry(is_dat: bool, entry: &Entry, destination: &Path) {
    let record = &entry.record;

    if is_dat {
        println!(
            "{:<8X}\t{:<8X}\t{:<8X}\t{}\t{}",
            record.data_offset,
            record.packed_size,
            record.unpacked_size,
            record.codec.label(),
            destination.display()
        );
    } else {
        println!(
            "{:<8X}\t{:<8X}\t{}\t{}",
            record.data_offset,
            record.packed_size,
            entry.index,
            destination.display()
        );
    }
}

fn print_summary(stats: &ExtractStats, output_path: &Path) {
    println!(
        "\nExtracted {} files ({} read, {} written) to {}",
        stats.files_extracted,
        human_size(stats.bytes_read),
        human_size(stats.bytes_written),
        output_path.display()
    );

    if stats.raw_fallbacks > 0 {
        println!(
            "{} packed files used an unknown algorithm and were written raw",
            stats.raw_fallbacks
        );
    }
}
