pub mod context;
pub mod decision;

pub use context::CommandContext;
pub use decision::{AuthDecision, Execution};

use std::collections::BTreeMap;

use crate::commands::notifier::NOTIFIER_COMMAND;
use crate::commands::{ChannelNotifications, KubectlExecutor, NotifierExecutor, NotifierHandler};
use crate::config::{ChannelConfig, Config};
use crate::error::Error;
use crate::parse;

/// Routes chat messages to the executor that handles them.
///
/// Channel bindings and the auth flag are resolved here from config, so
/// executors only see plain binding names.
pub struct CommandRouter {
    cluster_name: String,
    channels: BTreeMap<String, ChannelConfig>,
    kubectl: KubectlExecutor,
    notifier: NotifierExecutor,
    notifications: Box<dyn NotifierHandler>,
}

impl CommandRouter {
    /// Build the router and its executors from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config,
            KubectlExecutor::from_config(config),
            Box::new(ChannelNotifications::from_config(config)),
        )
    }

    /// Build a router around an existing kubectl executor and notifier state.
    pub fn new(
        config: &Config,
        kubectl: KubectlExecutor,
        notifications: Box<dyn NotifierHandler>,
    ) -> Self {
        Self {
            cluster_name: config.settings.cluster_name.clone(),
            channels: config.channels.clone(),
            kubectl,
            notifier: NotifierExecutor::new(config.clone()),
            notifications,
        }
    }

    /// Handle one message (bot mention already trimmed) from `channel`.
    ///
    /// Unknown channels have no bindings and are not auth channels.
    pub fn execute(&self, channel: &str, message: &str) -> Result<Execution, Error> {
        let words = parse::words(message);
        let Some(first) = words.first() else {
            return Err(Error::EmptyCommand);
        };

        let default_channel = ChannelConfig::default();
        let channel_cfg = self.channels.get(channel).unwrap_or(&default_channel);

        if first.eq_ignore_ascii_case(NOTIFIER_COMMAND) {
            let message = self.notifier.execute(
                &words,
                channel,
                &self.cluster_name,
                self.notifications.as_ref(),
            )?;
            return Ok(Execution {
                message,
                command_label: NotifierExecutor::command_label(&words),
            });
        }

        if is_commands_list(&words) {
            return Ok(Execution {
                message: self.commands_list(&channel_cfg.bindings),
                command_label: "commands list".to_string(),
            });
        }

        if self.kubectl.can_handle(&channel_cfg.bindings, &words) {
            let message = self.kubectl.execute(
                &channel_cfg.bindings,
                message,
                channel_cfg.auth,
                &self.cluster_name,
            )?;
            return Ok(Execution {
                message,
                command_label: self.kubectl.tokenizer().command_prefix(&words),
            });
        }

        Err(Error::UnsupportedCommand)
    }

    fn commands_list(&self, bindings: &[String]) -> String {
        let enabled = self.kubectl.enabled_permissions(bindings);
        if enabled.allowed_verbs.is_empty() {
            return format!(
                "No kubectl commands are enabled in this channel on cluster '{}'.",
                self.cluster_name
            );
        }

        let join = |set: &std::collections::BTreeSet<String>| {
            set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        };
        format!(
            "Allowed kubectl verbs on cluster '{}': {}\nAllowed kubectl resources: {}",
            self.cluster_name,
            join(&enabled.allowed_verbs),
            join(&enabled.allowed_resources),
        )
    }
}

fn is_commands_list(words: &[String]) -> bool {
    matches!(words, [a, b] if a.eq_ignore_ascii_case("commands") && b.eq_ignore_ascii_case("list"))
}
