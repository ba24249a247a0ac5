use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser};
use eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use csvclean::{CleanerBuilder, TrailingField};

/// Clean up a CSV stream.
///
/// Quoted empty fields ("") become unquoted empty fields and CRLF line
/// terminators become LF. Everything else passes through unchanged.
#[derive(Debug, Parser)]
#[command(name = "csvclean", version, about)]
struct Args {
    /// Input file. Standard input is read when absent or `-`.
    input: Option<PathBuf>,

    /// Output file. Standard output is written when absent or `-`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write an unterminated final field instead of dropping it.
    #[arg(long)]
    keep_trailing: bool,

    /// Log more (repeat for even more). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(&args) {
        eprintln!("csvclean: {:#}", err);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let (rdr, name): (Box<dyn io::Read>, String) = match path(&args.input) {
        None => (Box::new(io::stdin().lock()), "<stdin>".to_string()),
        Some(p) => {
            let file = File::open(p)
                .wrap_err_with(|| format!("failed to open {}", p.display()))?;
            (Box::new(file), p.display().to_string())
        }
    };
    let wtr: Box<dyn io::Write> = match path(&args.output) {
        None => Box::new(BufWriter::new(io::stdout().lock())),
        Some(p) => {
            let file = File::create(p).wrap_err_with(|| {
                format!("failed to create {}", p.display())
            })?;
            Box::new(BufWriter::new(file))
        }
    };

    let trailing = if args.keep_trailing {
        TrailingField::Emit
    } else {
        TrailingField::Drop
    };
    let cleaner = CleanerBuilder::new().trailing(trailing).build();
    let summary = cleaner
        .clean(rdr, wtr)
        .wrap_err_with(|| format!("error cleaning CSV from {}", name))?;
    info!(
        input = %name,
        bytes_read = summary.bytes_read(),
        bytes_written = summary.bytes_written(),
        fields = summary.fields(),
        records = summary.records(),
        "done"
    );
    Ok(())
}

/// Treats a missing path and `-` the same: both mean a standard stream.
fn path(p: &Option<PathBuf>) -> Option<&Path> {
    match *p {
        Some(ref p) if p.as_os_str() != "-" => Some(p.as_path()),
        _ => None,
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}
