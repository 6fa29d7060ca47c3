use crate::bio::table::{default_output_path, read_fragments, write_results};
use crate::cli::output::*;
use crate::core::config::{default_config, load_config, Config, Preference};
use crate::core::pipeline::Pipeline;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GroupArgs {
    /// Fragment table with Name, Author and Sequence columns
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output table (default: <input stem>_grouped.csv next to the input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(short = 'c', long, env = "FRAGGROUP_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Pair up leftover single-fragment groups
    #[arg(long)]
    pub aggressive: bool,

    /// Clustering preference: "auto" (median similarity) or a number
    #[arg(long, value_name = "auto|VALUE", allow_hyphen_values = true)]
    pub preference: Option<Preference>,

    /// Damping factor in (0, 1)
    #[arg(long)]
    pub damping: Option<f64>,

    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Iterations the exemplar assignment must stay unchanged
    #[arg(long)]
    pub convergence_window: Option<usize>,

    /// Maximum summed fragment length per group
    #[arg(long, value_name = "BASES")]
    pub max_group_length: Option<usize>,

    /// Fragments at least this long get a group of their own
    #[arg(long, value_name = "BASES")]
    pub standalone_length: Option<usize>,

    /// Pad assembled sequences to at least this length
    #[arg(long, value_name = "BASES")]
    pub pad_to: Option<usize>,

    /// Seed for padding
    #[arg(long)]
    pub seed: Option<u64>,

    /// Field delimiter for input and output tables
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl GroupArgs {
    /// Command-line values take precedence over the configuration file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.aggressive {
            config.grouping.aggressive = true;
        }
        if let Some(preference) = self.preference {
            config.clustering.preference = preference;
        }
        if let Some(damping) = self.damping {
            config.clustering.damping = damping;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.clustering.max_iterations = max_iterations;
        }
        if let Some(window) = self.convergence_window {
            config.clustering.convergence_window = window;
        }
        if self.max_group_length.is_some() {
            config.grouping.max_group_length = self.max_group_length;
        }
        if self.standalone_length.is_some() {
            config.grouping.standalone_length = self.standalone_length;
        }
        if self.pad_to.is_some() {
            config.padding.min_length = self.pad_to;
        }
        if let Some(seed) = self.seed {
            config.padding.seed = seed;
        }
        if let Some(delimiter) = self.delimiter {
            config.io.delimiter = delimiter;
        }
    }
}

pub fn run(args: GroupArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            load_config(path)?
        }
        None => default_config(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    let delimiter = config.delimiter_byte();
    let records = read_fragments(&args.input, delimiter)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));

    if !args.quiet && !args.json {
        info(&format!(
            "Grouping {} fragments from {}",
            format_number(records.len()),
            args.input.display()
        ));
    }

    let result = Pipeline::new(config)
        .with_silent(args.quiet || args.json)
        .run(&records)?;

    // Pipeline warnings are already logged to stderr through tracing
    write_results(&output, &result.records, delimiter)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !args.quiet {
        print_summary(&result);
        success(&format!(
            "Wrote {} groups to {}",
            result.group_count(),
            output.display()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> GroupArgs {
        let mut argv = vec!["fraggroup", "group"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Group(args) => args,
            _ => panic!("expected group command"),
        }
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let args = parse(&[
            "-i",
            "in.csv",
            "--aggressive",
            "--preference",
            "-25",
            "--damping",
            "0.6",
            "--pad-to",
            "301",
            "--delimiter",
            ",",
        ]);

        let mut config = Config::default();
        config.padding.seed = 3;
        args.apply_overrides(&mut config);

        assert!(config.grouping.aggressive);
        assert_eq!(config.clustering.preference, Preference::Fixed(-25.0));
        assert_eq!(config.clustering.damping, 0.6);
        assert_eq!(config.padding.min_length, Some(301));
        assert_eq!(config.padding.seed, 3);
        assert_eq!(config.io.delimiter, ',');
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = parse(&["-i", "in.csv"]);
        let mut config = Config::default();
        config.grouping.aggressive = true;
        config.grouping.max_group_length = Some(499);

        args.apply_overrides(&mut config);

        assert!(config.grouping.aggressive);
        assert_eq!(config.grouping.max_group_length, Some(499));
        assert_eq!(config.clustering.preference, Preference::Auto);
    }

    #[test]
    fn test_preference_keyword() {
        let args = parse(&["-i", "in.csv", "--preference", "auto"]);
        assert_eq!(args.preference, Some(Preference::Auto));
    }
}
