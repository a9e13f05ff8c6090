mod cli;
mod codec;
mod config;
mod core;
mod depth;
mod error;
mod shared;
mod stream;
mod utils;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::config::ExtractConfig;
use crate::core::extractor;

fn main() -> Result<()> {
    crate::utils::logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Extract(args) => {
            let config = ExtractConfig::from_args(args)?;
            let summary = extractor::extract_frames(&config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }
            println!(
                "Read {} frames, exported {}: {} images written, {} failed",
                summary.frames_read,
                summary.frames_exported,
                summary.images_written,
                summary.images_failed
            );
            for failure in &summary.failures {
                println!(
                    "  t{} c{} {}: {}",
                    failure.frame, failure.camera, failure.stream, failure.message
                );
            }
        }
        Commands::Inspect(args) => {
            let stats = extractor::inspect_stream(args)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
