//! bytepress CLI - lossless file compression tool
//!
//! A command-line interface for the bytepress library.
//! Supports Huffman, LZ77, and RLE codecs.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use bytepress::compress::{Lz77Options, RleMode};
use bytepress::{Algorithm, CompressOptions, PartialOutput};

/// A streaming lossless compression tool.
#[derive(Parser, Debug)]
#[command(name = "bytepress")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Show verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file
    Compress(CodecArgs),
    /// Decompress a file
    Decompress(CodecArgs),
}

#[derive(clap::Args, Debug)]
struct CodecArgs {
    /// Input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file path (derived from the input when omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Codec (defaults to the input extension when decompressing, else huffman)
    #[arg(short, long, value_enum)]
    algorithm: Option<AlgorithmArg>,

    /// RLE record layout
    #[arg(long, value_enum, default_value = "basic")]
    rle_mode: RleModeArg,

    /// LZ77 compression level (1-9, higher = smaller file)
    #[arg(
        short = 'l',
        long,
        default_value = "6",
        value_parser = clap::value_parser!(u8).range(1..=9)
    )]
    level: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    /// Static Huffman coding
    Huffman,
    /// LZ77 sliding-window matching
    Lz77,
    /// Run-length encoding
    Rle,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RleModeArg {
    /// (count, byte) pairs
    Basic,
    /// Runs plus literal groups
    Advanced,
}

impl From<RleModeArg> for RleMode {
    fn from(arg: RleModeArg) -> Self {
        match arg {
            RleModeArg::Basic => RleMode::Basic,
            RleModeArg::Advanced => RleMode::Advanced,
        }
    }
}

impl CodecArgs {
    fn algorithm(&self, decompressing: bool) -> Algorithm {
        match self.algorithm {
            Some(AlgorithmArg::Huffman) => Algorithm::Huffman,
            Some(AlgorithmArg::Lz77) => Algorithm::Lz77,
            Some(AlgorithmArg::Rle) => Algorithm::Rle(self.rle_mode.into()),
            None if decompressing => self
                .input
                .extension()
                .and_then(|e| e.to_str())
                .and_then(|e| Algorithm::from_extension(&e.to_lowercase()))
                .unwrap_or_default(),
            None => Algorithm::Huffman,
        }
    }
}

/// `file.txt` -> `file.txt.huf`
fn compressed_path(input: &Path, algorithm: Algorithm) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(algorithm.extension());
    PathBuf::from(name)
}

/// `file.txt.huf` -> `file.txt`; anything else gets `.out` appended.
fn decompressed_path(input: &Path, algorithm: Algorithm) -> PathBuf {
    let matches = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(algorithm.extension()));
    if matches {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_os_string();
        name.push(".out");
        PathBuf::from(name)
    }
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (codec, decompressing) = match &args.command {
        Command::Compress(codec) => (codec, false),
        Command::Decompress(codec) => (codec, true),
    };
    let algorithm = codec.algorithm(decompressing);
    let options = CompressOptions {
        lz77: Lz77Options::level(codec.level),
        ..CompressOptions::default()
    };

    let output_path = codec.output.clone().unwrap_or_else(|| {
        if decompressing {
            decompressed_path(&codec.input, algorithm)
        } else {
            compressed_path(&codec.input, algorithm)
        }
    });
    if output_path == codec.input {
        return Err("output path must differ from the input".into());
    }

    let start = Instant::now();
    let mut input = BufReader::new(File::open(&codec.input)?);
    let mut output = PartialOutput::create(&output_path)?;
    if decompressing {
        bytepress::decompress_stream(algorithm, &mut input, &mut output, &options)?;
    } else {
        bytepress::compress_stream(algorithm, &mut input, &mut output, &options)?;
    }
    output.commit()?;
    let elapsed = start.elapsed();

    // Report results
    let input_size = fs::metadata(&codec.input)?.len();
    let output_size = fs::metadata(&output_path)?.len();
    let ratio = if input_size > 0 {
        (output_size as f64 / input_size as f64) * 100.0
    } else {
        0.0
    };

    if args.verbose {
        eprintln!("Output: {:?}", output_path);
        eprintln!("  Algorithm: {:?}", algorithm);
        if algorithm == Algorithm::Lz77 && !decompressing {
            eprintln!("  Level: {}", codec.level);
        }
        eprintln!("  Time: {:.2?}", elapsed);
        eprintln!(
            "  Size: {} -> {} ({:.1}%)",
            format_size(input_size),
            format_size(output_size),
            ratio
        );
    } else {
        println!(
            "{} -> {} ({:.1}%)",
            format_size(input_size),
            format_size(output_size),
            ratio
        );
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
