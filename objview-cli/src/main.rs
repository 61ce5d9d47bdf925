/// objview - load a geometry file, transform it and print the result
///
/// Examples:
///   objview cube.obj
///   objview cube.obj -e "rotate 30 y" -e "position 0 1 0" --dump
///   RUST_LOG=debug objview teapot.obj --script edits.txt
use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use objview_cli::{run, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)?;
    out.flush()?;
    Ok(())
}
