//! block-encode - construct a canonical Huffman encoding of a symbol stream
//! and print the resulting DEFLATE/Deflate64 block as text.
//!
//! The input is a literal/length/distance symbol stream: character and
//! string literals, `(length, distance)` pairs, or bare decimal symbols
//! (see `inflatelib_deflate::symbols` for the grammar). The output is the
//! line-based binary-token rendering consumed by the companion bit-packer.

use clap::{Parser, ValueEnum};
use inflatelib_deflate::{InflateMode, encode_block_text, parse_symbol_stream};
use std::error::Error;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "block-encode")]
#[command(version, about = "Render a DEFLATE/Deflate64 block from a symbol stream")]
#[command(long_about = "
block-encode builds a fully-formed, bit-exact DEFLATE or Deflate64 block
from a textual symbol stream and prints it as binary tokens.

Examples:
  block-encode deflate symbols.txt
  echo \"'A' (3, 1)\" | block-encode deflate
  block-encode deflate64 symbols.txt static
")]
struct Cli {
    /// Bitstream variant to target
    #[arg(value_enum)]
    mode: ModeArg,

    /// Symbol stream file ("-" or omitted reads standard input)
    input: Option<PathBuf>,

    /// Pass "static" to force the RFC-defined fixed tables
    #[arg(value_enum)]
    tables: Option<TablesArg>,
}

/// Bitstream variant (for clap ValueEnum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// RFC 1951 DEFLATE: 32 KiB window
    Deflate,
    /// Microsoft Deflate64: 64 KiB window
    Deflate64,
}

impl From<ModeArg> for InflateMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Deflate => InflateMode::Deflate,
            ModeArg::Deflate64 => InflateMode::Deflate64,
        }
    }
}

/// Table selection keyword (for clap ValueEnum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TablesArg {
    /// Use the fixed static tables instead of building dynamic ones
    Static,
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let text = match &cli.input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mode = InflateMode::from(cli.mode);
    let items = parse_symbol_stream(mode, &text)?;
    let block = encode_block_text(mode, &items, cli.tables.is_some())?;
    print!("{}", block);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
