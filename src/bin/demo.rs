//! QuillKV Demo Binary
//!
//! Runs two transactions through the WAL and prints the store after each.

use std::process;

use clap::Parser;
use quillkv::config::{OperationPolicy, WalSyncStrategy};
use quillkv::wal::{BEGIN_TRANSACTION, SET};
use quillkv::{Config, Engine, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// QuillKV Demo
#[derive(Parser, Debug)]
#[command(name = "quillkv-demo")]
#[command(about = "Drive the write-ahead log through two transactions")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./quillkv_data")]
    data_dir: String,

    /// Number of updates in the first transaction
    #[arg(short, long, default_value = "100")]
    updates: u32,

    /// Reject operation labels outside the reserved set
    #[arg(long)]
    strict: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quillkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("QuillKV Demo v{}", quillkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let policy = if args.strict {
        OperationPolicy::Strict
    } else {
        OperationPolicy::Permissive
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .operation_policy(policy)
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&engine, &args) {
        tracing::error!("Demo failed: {}", e);
        process::exit(1);
    }

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        process::exit(1);
    }
}

fn run(engine: &Engine, args: &Args) -> Result<()> {
    // Under --strict only reserved labels are accepted
    let update_label = if args.strict {
        SET
    } else {
        "UPDATE account SET balance = 1200 WHERE account_id = 1234"
    };
    let update_payload = |value: u32| {
        if args.strict {
            format!("balance={}", value)
        } else {
            value.to_string()
        }
    };

    engine.append(BEGIN_TRANSACTION, "T1")?;
    for i in 0..args.updates {
        engine.append(update_label, &update_payload(1200 + i))?;
    }
    engine.commit()?;

    println!("First transaction committed successfully");
    println!("Current DB State: {:?}", engine.read());

    engine.append(BEGIN_TRANSACTION, "T2")?;
    engine.append(update_label, &update_payload(1500))?;
    engine.commit()?;

    println!("Second transaction committed successfully");
    println!("Current DB State: {:?}", engine.read());
    println!(
        "Committed through lsn {} (version {})",
        engine.committed_lsn(),
        engine.version()
    );

    Ok(())
}
