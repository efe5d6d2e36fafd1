//! kvscan — inspection CLI for ordered key-value stores.
//!
//! Opens an existing store read-only, runs one range scan per invocation,
//! and either streams the surviving records or counts them with periodic
//! progress. Records go to stdout; logs and progress go to stderr so the
//! record stream stays pipeable.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "kvscan", about = "Inspect ordered key-value stores", version)]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream records from a store
    Scan {
        /// Path to the store file
        path: PathBuf,

        #[command(flatten)]
        range: cli::scan::RangeOpts,

        /// Format records as JSON
        #[arg(short = 'j', long)]
        json: bool,

        /// Exclude keys from the stream
        #[arg(short = 'x', long)]
        exclude_keys: bool,

        /// Exclude values from the stream
        #[arg(short = 'X', long)]
        exclude_values: bool,

        /// Only output records (suppress informational logging)
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// Count records in a store (bounds and filters apply; unlimited
    /// unless --limit is given)
    Count {
        /// Path to the store file
        path: PathBuf,

        #[command(flatten)]
        range: cli::scan::RangeOpts,

        /// Suppress progress lines
        #[arg(short = 'q', long)]
        quiet: bool,
    },
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Scan { json, .. } => *json,
        Commands::Count { .. } => false,
    }
}

fn command_is_quiet(command: &Commands) -> bool {
    match command {
        Commands::Scan { quiet, .. } | Commands::Count { quiet, .. } => *quiet,
    }
}

/// Cancellation flag set by SIGINT/SIGTERM; the scan loop polls it
/// between records and still runs the guaranteed close path.
#[cfg(unix)]
fn install_cancel_flag() -> anyhow::Result<Arc<AtomicBool>> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("received signal {}, closing scan...", sig);
            handler_flag.store(true, Ordering::SeqCst);
        }
    });
    Ok(flag)
}

#[cfg(windows)]
fn install_cancel_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    ctrlc::set_handler(move || {
        info!("received Ctrl+C, closing scan...");
        handler_flag.store(true, Ordering::SeqCst);
    })?;
    Ok(flag)
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "kvscan=debug,kvscan_store=debug"
    } else if quiet {
        "kvscan=warn,kvscan_store=warn"
    } else {
        "kvscan=info,kvscan_store=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter),
        )
        .init();
}

fn run_command(cli: Cli, cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    match cli.command {
        Commands::Scan {
            path,
            range,
            json,
            exclude_keys,
            exclude_values,
            quiet: _,
        } => cli::scan::run(
            cli::scan::ScanArgs {
                path,
                range,
                json,
                exclude_keys,
                exclude_values,
            },
            cancel,
        ),

        Commands::Count {
            path,
            range,
            quiet,
        } => cli::scan::run_count(cli::scan::CountArgs { path, range, quiet }, cancel),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_mode = command_wants_json(&cli.command);
    init_logging(cli.verbose, command_is_quiet(&cli.command));

    let cancel = match install_cancel_flag() {
        Ok(flag) => flag,
        Err(err) => {
            eprintln!("Warning: failed to install signal handler: {err}");
            Arc::new(AtomicBool::new(false))
        }
    };

    match run_command(cli, cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
