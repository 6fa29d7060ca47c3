use crate::cli::output::*;
use crate::core::config::{default_config, load_config, save_config};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the default configuration to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Load and validate an existing configuration file
    #[arg(long, value_name = "FILE", conflicts_with = "output")]
    pub check: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.check {
        let config = load_config(path)?;
        config.validate()?;
        success(&format!("{} is valid", path.display()));
        return Ok(());
    }

    let config = default_config();
    match &args.output {
        Some(path) => {
            save_config(path, &config)?;
            success(&format!("Default configuration written to {}", path.display()));
        }
        None => print!("{}", config.to_toml_string()?),
    }

    Ok(())
}
