// src/main.rs
mod logger;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use huffpack::PayloadFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "huffpack", version)]
#[command(about = "Huffman-code a file into a payload and a code table.", long_about = None)]
struct Cli {
    /// Log every stage, not just the results
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum FormatArg {
    #[clap(help = "Bits packed eight per byte behind a checksummed header (Default).")]
    Packed,
    #[clap(help = "One ASCII '0' or '1' per bit, readable but eight times larger.")]
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a payload and a code table
    Compress {
        input: PathBuf,
        payload: PathBuf,
        table: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Packed)]
        format: FormatArg,
    },
    /// Rebuild the original file from a payload and its code table
    Decompress {
        payload: PathBuf,
        table: PathBuf,
        output: PathBuf,
    },
    /// Decode a payload in memory and verify it without writing anything
    Check { payload: PathBuf, table: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose).context("failed to set up logging")?;

    match cli.command {
        Commands::Compress {
            input,
            payload,
            table,
            format,
        } => {
            let format = match format {
                FormatArg::Packed => PayloadFormat::Packed,
                FormatArg::Text => PayloadFormat::Text,
            };
            huffpack::compress_to_store(&input, &payload, &table, format)
                .with_context(|| format!("compressing {}", input.display()))?;
        }
        Commands::Decompress {
            payload,
            table,
            output,
        } => {
            huffpack::decompress_from_store(&payload, &table, &output)
                .with_context(|| format!("decompressing {}", payload.display()))?;
        }
        Commands::Check { payload, table } => {
            huffpack::check_store(&payload, &table)
                .with_context(|| format!("checking {}", payload.display()))?;
        }
    }
    Ok(())
}
