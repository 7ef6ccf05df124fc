#![deny(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use runtime::Args;
use tracing::Level;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // Logs go to stderr so --json output stays machine readable
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let summary = runtime::run(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
