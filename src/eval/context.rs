use crate::error::Error;
use crate::parse::{self, NamespaceResolution, Tokenizer};

/// A kubectl command taken apart for authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Arguments with the alias prefix removed.
    pub args: Vec<String>,
    /// First argument, e.g. `get`.
    pub verb: String,
    /// Second argument up to an optional `/`, e.g. `pods` for `pods/foo`.
    ///
    /// Empty for single-word commands. A misplaced flag (`get -n foo pods`)
    /// lands here too, so the caller can point the user at the right order.
    pub resource: String,
    pub namespace: NamespaceResolution,
}

impl CommandContext {
    /// Tokenize `command` and resolve its verb, resource and namespace flags.
    pub fn parse(tokenizer: &Tokenizer, command: &str) -> Result<Self, Error> {
        let args = tokenizer.tokenize(command);
        let Some(verb) = args.first().cloned() else {
            return Err(Error::EmptyCommand);
        };
        let resource = resource_name(&args);
        let namespace = resolve_namespace(&args)?;

        Ok(Self {
            args,
            verb,
            resource,
            namespace,
        })
    }
}

fn resource_name(args: &[String]) -> String {
    let Some(arg) = args.get(1) else {
        return String::new();
    };
    match arg.split_once('/') {
        Some((resource, _)) => resource.to_string(),
        None => arg.clone(),
    }
}

/// `-A` beats `-n`: kubectl ignores the namespace when both are given.
fn resolve_namespace(args: &[String]) -> Result<NamespaceResolution, Error> {
    if parse::extract_all_namespaces(args)? {
        return Ok(NamespaceResolution::AllNamespaces);
    }

    let ns = parse::extract_namespace(args)?;
    if ns.is_empty() {
        Ok(NamespaceResolution::Unspecified)
    } else {
        Ok(NamespaceResolution::Explicit(ns))
    }
}
