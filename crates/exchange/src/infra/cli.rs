use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// The log filter.
    #[clap(long, env, default_value = "info,exchange=debug")]
    pub log_filter: String,

    /// At which log level logs should be printed to stderr instead of stdout.
    #[clap(long, env)]
    pub stderr_threshold: Option<tracing::Level>,

    /// Whether to use JSON format for the logs.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,

    /// Path to the exchange configuration file. This file should be in TOML
    /// format. For an example see `crates/exchange/example.toml`. Without it
    /// the exchange runs on chain 1 without protocol fees.
    #[clap(long, env)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Settle the two orders of a JSON scenario against in-memory balances
    /// and print the receipt.
    Settle {
        #[clap(long)]
        scenario: PathBuf,
    },
    /// Print the key, struct hash and signing hash of a JSON order.
    Hash {
        #[clap(long)]
        order: PathBuf,
    },
}
