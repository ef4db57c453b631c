use std::path::{Path, PathBuf};

use ttdat_format::{Codec, CodecError};

use super::human_size;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct UnpackArgs {
    pub path: PathBuf,
    pub size: Option<u32>,
    pub packed: Option<u32>,
    pub codec: Option<Codec>,
    pub output: Option<PathBuf>,
}

/// `<file>.dec` next to the input.
fn default_output(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".dec");
    PathBuf::from(name)
}

pub fn run(args: UnpackArgs) -> Result<()> {
    let data = std::fs::read(&args.path).map_err(|source| Error::ReadInput {
        path: args.path.clone(),
        source,
    })?;

    let decompress_error = |source| Error::Decompress {
        path: args.path.clone(),
        source,
    };

    let input = match args.packed {
        Some(packed) => data.get(..packed as usize).ok_or_else(|| {
            decompress_error(CodecError::InputOverrun {
                consumed: packed as usize,
                available: data.len(),
            })
        })?,
        None => &data[..],
    };

    let codec = args.codec.unwrap_or_else(|| Codec::detect(input));
    tracing::debug!(codec = %codec, input = input.len(), "unpacking single file");

    let unpacked = codec
        .decompress(input, args.size)
        .map_err(decompress_error)?;

    let output = match args.output {
        Some(output) => output,
        None => default_output(&args.path),
    };
    std::fs::write(&output, &unpacked).map_err(|source| Error::WriteOutput {
        path: output.clone(),
        source,
    })?;

    println!(
        "Unpacked {} ({}, {}) to {} ({})",
        args.path.display(),
        codec,
        human_size(input.len() as u64),
        output.display(),
        human_size(unpacked.len() as u64)
    );

    Ok(())
}
