//! sourcemat - batch PBR texture sets into Source engine materials

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sourcemat::config::Config;
use sourcemat::pipeline;

#[derive(Parser)]
#[command(name = "sourcemat")]
#[command(version)]
#[command(about = "Converts PBR texture sets into Source engine VTF/VMT materials")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Enable verbose logging (use RUST_LOG=debug for more detail)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only initialize logging if verbose or RUST_LOG is set
    if cli.verbose || std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(
                if cli.verbose {
                    "sourcemat=debug".parse()?
                } else {
                    "sourcemat=warn".parse()?
                },
            ))
            .init();
    }

    let config = Config::load(&cli.config)?;

    println!("sourcemat v{}", env!("CARGO_PKG_VERSION"));
    println!("Input:  {}", config.input_dir.display());
    println!("Output: {}", config.output_dir.display());
    println!();

    let stats = pipeline::run(&config)?;

    println!("\n=== Conversion Summary ===");
    println!(
        "Materials: {} converted, {} failed",
        stats.converted, stats.failed
    );
    if stats.failed > 0 {
        println!("\nSome materials failed. Check logs and run again.");
    } else {
        println!("\nAll conversions finished.");
    }

    Ok(())
}
