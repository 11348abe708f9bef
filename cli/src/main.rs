// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # hashchain CLI
//!
//! Entry point for the `hashchain-cli` binary. Parses CLI arguments,
//! initializes logging, brings up the requested hash provider, mines the
//! chain off the async runtime, and prints the result.
//!
//! - `run`     — build, mine, validate, and print a chain
//! - `hash`    — hash a string with both providers
//! - `version` — print build version information

mod cli;
mod logging;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde_json::Value;
use tokio::signal;

use hashchain::{
    Block, CancelToken, Candidate, Chain, ChainError, HashProvider, MiningOptions, ProviderId,
    ProviderSet,
};

use cli::{Commands, HashchainCli};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "hashchain=info,hashchain_cli=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = HashchainCli::parse();
    logging::init_logging(DEFAULT_LOG_FILTER, cli.log_format)?;

    match cli.command {
        Commands::Run(args) => run_chain(args).await,
        Commands::Hash(args) => hash_input(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Builds a chain, mines `--blocks` blocks onto it, validates it, and prints
/// the chain as JSON followed by a short summary.
async fn run_chain(args: cli::RunArgs) -> Result<()> {
    let provider = ProviderId::from(args.provider);
    let payload: Value =
        serde_json::from_str(&args.payload).context("--payload is not valid JSON")?;
    let timestamp = args
        .timestamp
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string());

    tracing::info!(
        difficulty = args.difficulty,
        %provider,
        blocks = args.blocks,
        %timestamp,
        "starting chain"
    );

    let providers = Arc::new(ProviderSet::new());
    if provider == ProviderId::Accelerated {
        load_accelerated(&providers, Duration::from_secs(args.ready_timeout_secs)).await?;
    }

    let started = Instant::now();

    let genesis = Block::genesis(timestamp.clone(), None, provider, &providers)?;
    let mut chain = Chain::new(genesis, Arc::clone(&providers))?;

    let cancel = CancelToken::new();
    let mut options = MiningOptions::unbounded().with_cancel(cancel.clone());
    if let Some(secs) = args.timeout_secs {
        options = options.with_timeout(Duration::from_secs(secs));
    }

    let (blocks, difficulty) = (args.blocks, args.difficulty);
    let mut mining = tokio::task::spawn_blocking(move || -> Result<Chain, ChainError> {
        for _ in 0..blocks {
            let candidate = Candidate::new(timestamp.clone(), Some(payload.clone()), provider);
            chain.append_with(candidate, difficulty, &options)?;
        }
        Ok(chain)
    });

    let outcome = tokio::select! {
        res = &mut mining => res,
        _ = shutdown_signal() => {
            tracing::warn!("interrupt received, cancelling mining");
            cancel.cancel();
            mining.await
        }
    };
    let chain = outcome.context("mining task panicked")??;

    let valid = chain.validate()?;
    let elapsed = started.elapsed();

    println!("{}", chain.to_json_pretty()?);
    println!();
    println!("  Difficulty : {}", difficulty);
    println!("  Provider   : {}", provider);
    println!("  Blocks     : {}", chain.len());
    println!("  Valid      : {}", valid);
    println!("  Elapsed    : {:.3?}", elapsed);

    tracing::info!(valid, elapsed_ms = elapsed.as_millis() as u64, "chain complete");
    Ok(())
}

/// Loads the accelerated backend on a blocking thread and waits, bounded by
/// `timeout`, for it to report ready.
async fn load_accelerated(providers: &Arc<ProviderSet>, timeout: Duration) -> Result<()> {
    let loader = Arc::clone(providers);
    let load = tokio::task::spawn_blocking(move || loader.accelerated().load());

    let ready = async {
        load.await
            .context("accelerated backend loader panicked")?
            .context("accelerated backend failed to load")?;
        providers.accelerated().wait_ready().await;
        anyhow::Ok(())
    };

    tokio::time::timeout(timeout, ready)
        .await
        .map_err(|_| anyhow!("accelerated backend not ready after {:?}", timeout))??;

    tracing::info!("accelerated backend loaded");
    Ok(())
}

/// Hashes `input` with both providers and reports whether they agree.
fn hash_input(args: cli::HashArgs) -> Result<()> {
    let providers = ProviderSet::loaded().context("accelerated backend failed to load")?;

    let reference = providers.reference().hash(&args.input)?;
    let accelerated = providers.accelerated().hash(&args.input)?;

    println!("reference   {}", reference);
    println!("accelerated {}", accelerated);
    println!("match       {}", reference == accelerated);

    if reference != accelerated {
        return Err(anyhow!("providers disagree on {:?}", args.input));
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("hashchain-cli {}", env!("CARGO_PKG_VERSION"));
    println!("protocol      {}", hashchain::config::PROTOCOL_VERSION);
    println!("hash          {}", hashchain::config::HASH_FUNCTION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler can't be
/// installed, that signal source simply never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
