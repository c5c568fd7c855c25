use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "batchreg",
    about = "Batch registry: mint, transfer, recall, and burn tracked goods",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run an operation script against a fresh registry
    Run(RunArgs),
    /// Show the error code table
    Codes,
}

#[derive(Args)]
pub struct RunArgs {
    /// TOML script with [[step]] entries
    pub script: PathBuf,
    /// Gate configuration (TOML); defaults to the script's admin label
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Exit with an error if any step fails
    #[arg(long)]
    pub strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run() {
        let cli = Cli::try_parse_from(["batchreg", "run", "recall.toml"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.script, PathBuf::from("recall.toml"));
            assert!(args.config.is_none());
            assert!(!args.strict);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_run_with_config() {
        let cli = Cli::try_parse_from([
            "batchreg", "run", "s.toml", "--config", "gate.toml", "--strict",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("gate.toml")));
            assert!(args.strict);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_codes_json() {
        let cli = Cli::try_parse_from(["batchreg", "--format", "json", "codes"]).unwrap();
        assert!(matches!(cli.command, Command::Codes));
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["batchreg", "codes", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn run_requires_script() {
        assert!(Cli::try_parse_from(["batchreg", "run"]).is_err());
    }
}
