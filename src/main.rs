use clap::Parser;
use colored::*;
use fraggroup::cli::{Cli, Commands};
use fraggroup::utils::parallel::configure_thread_pool;
use fraggroup::FragGroupError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG takes precedence, then FRAGGROUP_LOG, then the -v level
    let log_level = std::env::var("FRAGGROUP_LOG").unwrap_or_else(|_| {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<FragGroupError>() {
            Some(FragGroupError::Configuration(_)) => 2,
            Some(FragGroupError::Io(_)) => 3,
            Some(FragGroupError::MalformedInput { .. }) | Some(FragGroupError::Parse(_)) => 4,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let threads = configure_thread_pool(cli.threads)
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    if cli.verbose > 0 {
        eprintln!("Using {} threads", threads);
    }

    match cli.command {
        Commands::Group(args) => fraggroup::cli::commands::group::run(args),
        Commands::Config(args) => fraggroup::cli::commands::config::run(args),
    }
}
