//! kubegate: a chatops relay that runs kubectl on behalf of chat channels.
//!
//! A chat message addressed to the bot is routed to an executor. kubectl
//! commands are authorized against the channel's bindings and come back
//! as a plain reply string: kubectl's output, a denial, or nothing at all
//! when the command was addressed to a different cluster.
//!
//! # Architecture
//!
//! - **[`parse`]**: alias-aware tokenizer, flag extraction, bot mentions.
//! - **[`policy`]**: binding merger and checker traits with config-backed implementations.
//! - **[`commands`]**: kubectl authorization pipeline, notifier toggles, subprocess runner.
//! - **[`eval`]**: command context, auth decisions, the [`CommandRouter`](crate::eval::CommandRouter).
//! - **[`config`]**: embedded defaults + user overlay merge.
//! - **[`logging`]**: `simplelog` setup and per-message decision records.

/// Executors for kubectl and notifier commands.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error type for pipeline failures.
pub mod error;
/// Routing, command context and decision types.
pub mod eval;
/// Logger setup and decision logging.
pub mod logging;
/// Tokenizer, flag extraction and bot mention matching.
pub mod parse;
/// Binding merge and permission checks.
pub mod policy;

pub use error::Error;

use eval::AuthDecision;

/// Authorize a kubectl command against the default configuration.
///
/// This is the main entry point for tests and simple usage.
/// For real use, build a [`CommandRouter`](crate::eval::CommandRouter) from loaded config.
pub fn authorize(
    bindings: &[String],
    command: &str,
    is_auth_channel: bool,
) -> Result<AuthDecision, Error> {
    let config = config::Config::default_config();
    let executor = commands::KubectlExecutor::from_config(&config);
    executor.authorize(bindings, command, is_auth_channel, &config.settings.cluster_name)
}
