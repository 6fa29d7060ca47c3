pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fraggroup",
    version,
    about = "Batch DNA fragments into dissimilar synthesis orders",
    long_about = "fraggroup clusters DNA fragments by edit distance, draws groups of up to three \
                  fragments from distinct clusters and assembles each group into one synthesis \
                  order with its repeated assembly sites swapped for alternatives."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Group a fragment table into synthesis orders
    Group(commands::group::GroupArgs),

    /// Print, save or check a configuration file
    Config(commands::config::ConfigArgs),
}
