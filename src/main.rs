// src/main.rs

use clap::Parser;
use wavedag::cli::CliArgs;
use wavedag::{logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("wavedag error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
