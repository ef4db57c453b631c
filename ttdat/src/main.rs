mod commands;
mod error;

use std::path::PathBuf;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;
use ttdat_format::Codec;

#[derive(Debug)]
struct ParseCodecError(String);

impl std::error::Error for ParseCodecError {}

impl std::fmt::Display for ParseCodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown packing algorithm: {} (expected none, 0, lz2k or 2)", self.0)
    }
}

fn parse_codec(src: &str) -> std::result::Result<Codec, ParseCodecError> {
    let codec = match src.to_ascii_lowercase().as_str() {
        "none" | "stored" | "0" => Codec::Stored,
        "lz2k" | "2" => Codec::Lz2k,
        _ => return Err(ParseCodecError(src.to_string())),
    };

    Ok(codec)
}

fn parse_size(src: &str) -> std::result::Result<u32, std::num::ParseIntError> {
    match src.strip_prefix("0x").or_else(|| src.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => src.parse(),
    }
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "ttdat",
    about = "Extract TT Games .DAT and .FPK archives.",
    usage = "ttdat <file> [-r] [-d <directory>]\n    ttdat <file> -u [-s <size>] [-p <packed>] [-a <alg>] [-o <output>]"
)]
struct CliOpts {
    #[structopt(
        name = "file",
        parse(from_os_str),
        help = "Path to the .DAT/.FPK archive, or to a packed file with -u"
    )]
    path: PathBuf,

    #[structopt(
        short,
        long,
        conflicts_with = "unpack",
        help = "Write packed entries as stored instead of unpacking them"
    )]
    raw: bool,

    #[structopt(
        short,
        long,
        parse(from_os_str),
        conflicts_with = "unpack",
        help = "Extract here instead of a directory named after the archive"
    )]
    directory: Option<PathBuf>,

    #[structopt(short, long, help = "Unpack a single packed file")]
    unpack: bool,

    #[structopt(
        short,
        long,
        parse(try_from_str = parse_size),
        requires = "unpack",
        help = "Expected unpacked size [decimal or 0x hex, default: decode all input]"
    )]
    size: Option<u32>,

    #[structopt(
        short,
        long,
        parse(try_from_str = parse_size),
        requires = "unpack",
        help = "Number of input bytes to read [default: whole file]"
    )]
    packed: Option<u32>,

    #[structopt(
        short = "a",
        long = "alg",
        parse(try_from_str = parse_codec),
        requires = "unpack",
        help = "Packing algorithm: none, 0, lz2k or 2 [default: detect]"
    )]
    algorithm: Option<Codec>,

    #[structopt(
        short,
        long,
        parse(from_os_str),
        requires = "unpack",
        help = "Output file [default: <file>.dec]"
    )]
    output: Option<PathBuf>,

    #[structopt(short, long, help = "Show verbose output")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let opts = CliOpts::from_iter(wild::args_os());
    init_logging(opts.verbose);

    let result = if opts.unpack {
        commands::unpack(commands::UnpackArgs {
            path: opts.path,
            size: opts.size,
            packed: opts.packed,
            codec: opts.algorithm,
            output: opts.output,
        })
    } else {
        commands::extract(opts.path, opts.directory, !opts.raw)
    };

    if let Err(e) = result {
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        eprintln!("error: {}", message);
        std::process::exit(1);
    }
}
