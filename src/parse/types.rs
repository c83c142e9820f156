//! Types produced by the argument parser and consumed by the executors.

use std::fmt;

/// How a command chose its namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceResolution {
    /// `-n <name>` / `--namespace <name>`.
    Explicit(String),
    /// `-A` / `--all-namespaces`; wins over an explicit namespace.
    AllNamespaces,
    /// Neither flag; a default has to be filled in.
    Unspecified,
}

/// The namespace scope a command will run in once defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionNamespace {
    /// A single concrete namespace.
    Named(String),
    /// Every namespace.
    All,
}

impl fmt::Display for ExecutionNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionNamespace::Named(name) => f.write_str(name),
            ExecutionNamespace::All => f.write_str("<all namespaces>"),
        }
    }
}
