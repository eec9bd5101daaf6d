mod cli;
mod config;
mod error;
mod runner;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            1
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, error::CliError> {
    // Diagnostics go to stderr; stdout carries the transcript.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let cfg = config::load_default().map_err(|e| error::CliError::Config(e.to_string()))?;

    let run_args = runner::RunArgs::new(&args, &cfg);
    runner::run(run_args).await?;

    Ok(0)
}
