//! Command executors: what the relay does with a message once routed.
//!
//! `kubectl` holds the authorization pipeline, `notifier` the per-channel
//! notification toggles, and `runner` the subprocess seam used by kubectl.

/// kubectl authorization, argument rewriting and execution.
pub mod kubectl;
/// `notifier start|stop|status|showconfig`.
pub mod notifier;
/// Subprocess runner trait and its process-spawning implementation.
pub mod runner;

pub use kubectl::KubectlExecutor;
pub use notifier::{ChannelNotifications, NotifierExecutor, NotifierHandler};
pub use runner::{CommandRunner, ProcessRunner, RunError};
