//! # CLI Interface
//!
//! Defines the command-line argument structure for `hashchain-cli` using
//! `clap` derive. Three subcommands: `run`, `hash`, and `version`.

use clap::{Parser, Subcommand, ValueEnum};

use hashchain::config::{DEFAULT_DIFFICULTY, PROVIDER_READY_TIMEOUT};
use hashchain::ProviderId;

use crate::logging::LogFormat;

/// Payload carried by every appended block unless `--payload` says otherwise.
pub const DEFAULT_PAYLOAD: &str = r#"{"from":"John","to":"Bob","amount":100}"#;

/// Proof-of-work hash chain demo.
///
/// Builds a chain from a null-payload genesis block, mines new blocks onto
/// it, validates it, and prints the result with timing.
#[derive(Parser, Debug)]
#[command(
    name = "hashchain-cli",
    about = "Proof-of-work hash chain demo",
    version,
    propagate_version = true
)]
pub struct HashchainCli {
    /// Log output format. Applies to every subcommand.
    #[arg(
        long,
        global = true,
        env = "HASHCHAIN_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, mine, validate, and print a chain.
    Run(RunArgs),
    /// Hash a string with both providers and check that they agree.
    Hash(HashArgs),
    /// Print version information and exit.
    Version,
}

/// SHA-256 implementation to mine with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// Plain `sha2` path. Always available.
    #[value(alias = "js")]
    Reference,
    /// Streaming path, loaded and self-tested at startup.
    #[value(alias = "ws")]
    Accelerated,
}

impl From<ProviderArg> for ProviderId {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Reference => ProviderId::Reference,
            ProviderArg::Accelerated => ProviderId::Accelerated,
        }
    }
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Leading hex zeros every mined digest must have.
    #[arg(long, short = 'd', env = "HASHCHAIN_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: usize,

    /// Hash provider for every block in the chain.
    #[arg(
        long,
        short = 'p',
        env = "HASHCHAIN_PROVIDER",
        value_enum,
        default_value_t = ProviderArg::Reference
    )]
    pub provider: ProviderArg,

    /// Number of blocks to mine on top of genesis.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub blocks: usize,

    /// JSON payload for each mined block.
    #[arg(long, default_value = DEFAULT_PAYLOAD)]
    pub payload: String,

    /// Timestamp token for every block. Defaults to now, in Unix milliseconds.
    #[arg(long, env = "HASHCHAIN_TIMESTAMP")]
    pub timestamp: Option<String>,

    /// Give up on mining after this many seconds. Unbounded when omitted.
    #[arg(long, env = "HASHCHAIN_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// How long to wait for the accelerated backend to come up.
    #[arg(long, default_value_t = PROVIDER_READY_TIMEOUT.as_secs())]
    pub ready_timeout_secs: u64,
}

/// Arguments for the `hash` subcommand.
#[derive(Parser, Debug)]
pub struct HashArgs {
    /// String to hash.
    pub input: String,
}
