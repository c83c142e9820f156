//! `notifier` commands: per-channel notification toggles.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::config::Config;
use crate::error::Error;

/// Word that routes a message to the notifier executor.
pub const NOTIFIER_COMMAND: &str = "notifier";

/// Stands in for unknown verbs in command labels, so free text typed by
/// users never reaches the decision log.
pub const ANONYMIZED_INVALID_VERB: &str = "{invalid verb}";

/// Failures reported by a [`NotifierHandler`].
#[derive(Debug, Error)]
pub enum NotifierError {
    /// The channel has no notification settings to toggle.
    #[error("notifications not configured for this channel")]
    NotConfigured,

    #[error("notification state is unavailable")]
    Unavailable,
}

/// Reads and toggles notification state per conversation.
pub trait NotifierHandler: Send + Sync {
    fn notifications_enabled(&self, conversation_id: &str) -> bool;

    fn set_notifications_enabled(
        &self,
        conversation_id: &str,
        enabled: bool,
    ) -> Result<(), NotifierError>;
}

/// In-memory notification state seeded from the configured channels.
///
/// Toggles last for the lifetime of the process.
#[derive(Debug, Default)]
pub struct ChannelNotifications {
    enabled: Mutex<HashMap<String, bool>>,
}

impl ChannelNotifications {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: Mutex::new(
                config
                    .channels
                    .iter()
                    .map(|(id, ch)| (id.clone(), ch.notifications))
                    .collect(),
            ),
        }
    }
}

impl NotifierHandler for ChannelNotifications {
    fn notifications_enabled(&self, conversation_id: &str) -> bool {
        self.enabled
            .lock()
            .map(|m| m.get(conversation_id).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    fn set_notifications_enabled(
        &self,
        conversation_id: &str,
        enabled: bool,
    ) -> Result<(), NotifierError> {
        let mut map = self.enabled.lock().map_err(|_| NotifierError::Unavailable)?;
        let Some(state) = map.get_mut(conversation_id) else {
            return Err(NotifierError::NotConfigured);
        };
        *state = enabled;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotifierAction {
    Start,
    Stop,
    Status,
    ShowConfig,
}

impl NotifierAction {
    fn parse(verb: &str) -> Option<Self> {
        match verb.to_lowercase().as_str() {
            "start" => Some(NotifierAction::Start),
            "stop" => Some(NotifierAction::Stop),
            "status" => Some(NotifierAction::Status),
            "showconfig" => Some(NotifierAction::ShowConfig),
            _ => None,
        }
    }
}

/// Handles `notifier start|stop|status|showconfig`.
pub struct NotifierExecutor {
    config: Config,
}

impl NotifierExecutor {
    /// `config` is what `showconfig` prints.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Anonymized label for `args`, safe to record.
    pub fn command_label(args: &[String]) -> String {
        let verb = match args.get(1) {
            Some(v) if NotifierAction::parse(v).is_some() => v.as_str(),
            _ => ANONYMIZED_INVALID_VERB,
        };
        format!("{NOTIFIER_COMMAND} {verb}")
    }

    /// Run a notifier command; `args` must be exactly `[notifier, verb]`.
    pub fn execute(
        &self,
        args: &[String],
        conversation_id: &str,
        cluster_name: &str,
        handler: &dyn NotifierHandler,
    ) -> Result<String, Error> {
        let [_, verb] = args else {
            return Err(Error::InvalidCommand);
        };
        let Some(action) = NotifierAction::parse(verb) else {
            return Err(Error::UnsupportedCommand);
        };

        match action {
            NotifierAction::Start => self.toggle(conversation_id, cluster_name, handler, true),
            NotifierAction::Stop => self.toggle(conversation_id, cluster_name, handler, false),
            NotifierAction::Status => {
                let state = if handler.notifications_enabled(conversation_id) {
                    "enabled"
                } else {
                    "disabled"
                };
                Ok(format!("Notifications from cluster '{cluster_name}' are {state} here."))
            }
            NotifierAction::ShowConfig => {
                let rendered = self.config.to_toml()?;
                Ok(format!("Showing config for cluster {cluster_name:?}:\n\n{rendered}"))
            }
        }
    }

    fn toggle(
        &self,
        conversation_id: &str,
        cluster_name: &str,
        handler: &dyn NotifierHandler,
        enabled: bool,
    ) -> Result<String, Error> {
        match handler.set_notifications_enabled(conversation_id, enabled) {
            Ok(()) => {}
            Err(NotifierError::NotConfigured) => {
                return Ok(format!(
                    "I'm not configured to send notifications here ('{conversation_id}') from cluster '{cluster_name}', so you cannot turn them on or off."
                ));
            }
            Err(source) => return Err(Error::Notifier { enabled, source }),
        }

        log::info!("Notifications for {conversation_id:?} set to {enabled}");
        if enabled {
            Ok(format!("Brace yourselves, incoming notifications from cluster '{cluster_name}'."))
        } else {
            Ok(format!("Sure! I won't send you notifications from cluster '{cluster_name}' here."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn setup() -> (NotifierExecutor, ChannelNotifications) {
        let config = Config::default_config();
        let handler = ChannelNotifications::from_config(&config);
        (NotifierExecutor::new(config), handler)
    }

    #[test]
    fn status_reflects_config() {
        let (exec, handler) = setup();
        let out = exec.execute(&args("notifier status"), "general", "prod", &handler).unwrap();
        assert_eq!(out, "Notifications from cluster 'prod' are enabled here.");
    }

    #[test]
    fn stop_then_start() {
        let (exec, handler) = setup();

        let out = exec.execute(&args("notifier stop"), "general", "prod", &handler).unwrap();
        assert_eq!(out, "Sure! I won't send you notifications from cluster 'prod' here.");
        assert!(!handler.notifications_enabled("general"));

        let out = exec.execute(&args("notifier START"), "general", "prod", &handler).unwrap();
        assert_eq!(out, "Brace yourselves, incoming notifications from cluster 'prod'.");
        assert!(handler.notifications_enabled("general"));
    }

    #[test]
    fn unknown_channel() {
        let (exec, handler) = setup();
        let out = exec.execute(&args("notifier start"), "random", "prod", &handler).unwrap();
        assert_eq!(
            out,
            "I'm not configured to send notifications here ('random') from cluster 'prod', so you cannot turn them on or off."
        );
        assert!(!handler.notifications_enabled("random"));
    }

    #[test]
    fn handler_failure_propagates() {
        struct Broken;
        impl NotifierHandler for Broken {
            fn notifications_enabled(&self, _: &str) -> bool {
                false
            }
            fn set_notifications_enabled(&self, _: &str, _: bool) -> Result<(), NotifierError> {
                Err(NotifierError::Unavailable)
            }
        }

        let (exec, _) = setup();
        let err = exec.execute(&args("notifier stop"), "general", "prod", &Broken).unwrap_err();
        assert!(matches!(err, Error::Notifier { enabled: false, .. }));
    }

    #[test]
    fn showconfig_dumps_toml() {
        let (exec, handler) = setup();
        let out = exec.execute(&args("notifier showconfig"), "general", "prod", &handler).unwrap();
        assert!(out.starts_with("Showing config for cluster \"prod\":\n\n"));
        assert!(out.contains("kubectl-read-only"));
    }

    #[test]
    fn wrong_arity() {
        let (exec, handler) = setup();
        let err = exec.execute(&args("notifier"), "general", "prod", &handler).unwrap_err();
        assert!(matches!(err, Error::InvalidCommand));
        let err = exec
            .execute(&args("notifier start now"), "general", "prod", &handler)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCommand));
    }

    #[test]
    fn unknown_verb() {
        let (exec, handler) = setup();
        let err = exec.execute(&args("notifier pause"), "general", "prod", &handler).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCommand));
    }

    #[test]
    fn labels_hide_unknown_verbs() {
        assert_eq!(NotifierExecutor::command_label(&args("notifier stop")), "notifier stop");
        assert_eq!(
            NotifierExecutor::command_label(&args("notifier my-secret-text")),
            "notifier {invalid verb}"
        );
        assert_eq!(NotifierExecutor::command_label(&args("notifier")), "notifier {invalid verb}");
    }
}
