//! Error types for the relay.
//!
//! Only pipeline failures end up here. Policy denials are ordinary reply
//! strings, and a failed kubectl run is folded into the reply text.

use thiserror::Error;

use crate::commands::notifier::NotifierError;

/// Errors that abort handling of a single chat message.
#[derive(Debug, Error)]
pub enum Error {
    /// Nothing left to run after alias stripping.
    #[error("command is empty")]
    EmptyCommand,

    /// A recognized flag has a missing or invalid value.
    #[error("malformed flag '{flag}': {reason}")]
    MalformedFlag { flag: String, reason: String },

    /// The command has the wrong shape for its executor.
    #[error("invalid command")]
    InvalidCommand,

    /// No executor handles the command.
    #[error("command not supported")]
    UnsupportedCommand,

    /// The notifier handler refused to toggle notifications.
    #[error("while setting notifications to {enabled}: {source}")]
    Notifier {
        enabled: bool,
        #[source]
        source: NotifierError,
    },

    /// The configuration file could not be read.
    #[error("while reading config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the config schema.
    #[error("while parsing config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The effective configuration could not be rendered.
    #[error("while executing 'showconfig' command: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn malformed_flag(flag: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedFlag {
            flag: flag.into(),
            reason: reason.into(),
        }
    }
}
