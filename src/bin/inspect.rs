//! QuillKV Inspect Tool
//!
//! Reads WAL and snapshot files without opening an engine.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use quillkv::snapshot;
use quillkv::wal::WalReader;
use quillkv::Result;
use tracing_subscriber::{fmt, EnvFilter};

/// QuillKV Inspect
#[derive(Parser, Debug)]
#[command(name = "quillkv-inspect")]
#[command(about = "Inspect QuillKV WAL and snapshot files")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every record in a WAL file
    Dump {
        /// Path to wal.log
        wal: PathBuf,
    },

    /// Check every record's checksum
    Verify {
        /// Path to wal.log
        wal: PathBuf,
    },

    /// Print a snapshot file
    Snapshot {
        /// Path to the snapshot file
        file: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    match run(args.command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    }
}

/// Returns false when the inspected file is not intact
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Dump { wal } => {
            for record in WalReader::open(&wal)?.records() {
                let record = record?;
                println!("{:>8}  {:08x}  {}", record.lsn, record.checksum, record.operation);
            }
            Ok(true)
        }
        Commands::Verify { wal } => {
            let report = WalReader::verify(&wal)?;
            println!("valid records:     {}", report.records_valid);
            println!("corrupted records: {}", report.records_corrupted);
            println!("last lsn:          {}", report.last_lsn);
            println!("valid bytes:       {}", report.valid_bytes);
            println!("torn tail:         {}", report.torn_tail);
            Ok(report.is_clean())
        }
        Commands::Snapshot { file } => {
            for (key, value) in snapshot::load(&file)? {
                println!("{}={}", key, value);
            }
            Ok(true)
        }
    }
}
