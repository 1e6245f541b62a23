use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_HOST, ENV_PORT, ENV_SCORING_TIMEOUT_SECS, ENV_SCORING_URL,
};

#[derive(Parser)]
#[command(name = "pricepulse")]
#[command(version, about = "Pricing intelligence dashboard server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// ML scoring service base URL
    #[arg(long, global = true, env = ENV_SCORING_URL)]
    pub scoring_url: Option<String>,

    /// ML scoring request timeout in seconds
    #[arg(long, global = true, env = ENV_SCORING_TIMEOUT_SECS)]
    pub scoring_timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default when no subcommand is given)
    Start,
}

/// CLI configuration extracted from parsed arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub scoring_url: Option<String>,
    pub scoring_timeout_secs: Option<u64>,
}

/// Parse CLI arguments into a config struct plus the selected command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();

    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        scoring_url: cli.scoring_url,
        scoring_timeout_secs: cli.scoring_timeout_secs,
    };

    (config, cli.command)
}
