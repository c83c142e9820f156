/// Outcome of authorizing one kubectl command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// Reply with this message instead of running anything. Empty means stay silent.
    Denied(String),
    /// Run kubectl with these sanitized arguments.
    Allowed(Vec<String>),
}

impl AuthDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthDecision::Denied(_) => "deny",
            AuthDecision::Allowed(_) => "allow",
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthDecision::Allowed(_))
    }
}

/// Reply to one chat message, plus what the caller may record about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Text to post back; empty means say nothing.
    pub message: String,
    /// Anonymized command, e.g. `kc get` or `notifier start`.
    pub command_label: String,
}
