use std::collections::BTreeMap;

use regex::Regex;

use super::{EffectivePermissions, PermissionMerger};
use crate::config::KubectlBinding;
use crate::parse::ExecutionNamespace;

/// Include pattern that stands for every namespace.
pub const ALL_NAMESPACES_PATTERN: &str = ".*";

/// A namespace entry: matched literally, or as a fully anchored regex.
#[derive(Debug, Clone)]
struct NamespacePattern {
    raw: String,
    regex: Option<Regex>,
}

impl NamespacePattern {
    fn compile(raw: &str) -> Self {
        let regex = match Regex::new(&format!("^(?:{raw})$")) {
            Ok(r) => Some(r),
            Err(e) => {
                log::warn!(
                    "namespace pattern {raw:?} is not a valid regex, matching literally: {e}"
                );
                None
            }
        };
        Self {
            raw: raw.to_string(),
            regex,
        }
    }

    fn matches(&self, namespace: &str) -> bool {
        self.raw == namespace || self.regex.as_ref().is_some_and(|r| r.is_match(namespace))
    }
}

fn compile_all(patterns: &[String]) -> Vec<NamespacePattern> {
    patterns.iter().map(|p| NamespacePattern::compile(p)).collect()
}

#[derive(Debug, Clone)]
struct CompiledBinding {
    config: KubectlBinding,
    include: Vec<NamespacePattern>,
    exclude: Vec<NamespacePattern>,
}

impl CompiledBinding {
    fn new(config: &KubectlBinding) -> Self {
        Self {
            include: compile_all(&config.namespaces.include),
            exclude: compile_all(&config.namespaces.exclude),
            config: config.clone(),
        }
    }

    /// Exclusions win over inclusions; an empty name never matches.
    fn allows_namespace(&self, namespace: &str) -> bool {
        if namespace.is_empty() || self.exclude.iter().any(|p| p.matches(namespace)) {
            return false;
        }
        self.include.iter().any(|p| p.matches(namespace))
    }

    /// Unscoped bindings only: nothing excluded, and an include pattern
    /// that matches [`ALL_NAMESPACES_PATTERN`].
    fn covers_all_namespaces(&self) -> bool {
        self.exclude.is_empty()
            && self.include.iter().any(|p| p.matches(ALL_NAMESPACES_PATTERN))
    }
}

/// Merges bindings from configuration.
///
/// Verbs and resources are unioned. `default_namespace` and
/// `restrict_access` take the value of the last binding (in request order)
/// that sets them. Unknown binding names are skipped.
#[derive(Debug, Clone, Default)]
pub struct BindingMerger {
    bindings: BTreeMap<String, CompiledBinding>,
}

impl BindingMerger {
    /// Compile the namespace patterns of every configured binding.
    pub fn from_config(bindings: &BTreeMap<String, KubectlBinding>) -> Self {
        Self {
            bindings: bindings
                .iter()
                .map(|(name, b)| (name.clone(), CompiledBinding::new(b)))
                .collect(),
        }
    }

    fn merge<F>(&self, names: &[String], applies: F) -> EffectivePermissions
    where
        F: Fn(&CompiledBinding) -> bool,
    {
        let mut merged = EffectivePermissions::default();

        for name in names {
            let Some(binding) = self.bindings.get(name) else {
                log::debug!("skipping unknown binding {name:?}");
                continue;
            };
            if !binding.config.enabled || !applies(binding) {
                continue;
            }

            let cfg = &binding.config;
            merged.allowed_verbs.extend(cfg.commands.verbs.iter().cloned());
            merged.allowed_resources.extend(cfg.commands.resources.iter().cloned());
            if !cfg.default_namespace.is_empty() {
                merged.default_namespace = cfg.default_namespace.clone();
            }
            if let Some(restrict) = cfg.restrict_access {
                merged.restrict_access = restrict;
            }
        }

        merged
    }
}

impl PermissionMerger for BindingMerger {
    fn merge_for_namespace(
        &self,
        bindings: &[String],
        namespace: &ExecutionNamespace,
    ) -> EffectivePermissions {
        match namespace {
            ExecutionNamespace::All => self.merge(bindings, CompiledBinding::covers_all_namespaces),
            ExecutionNamespace::Named(ns) => self.merge(bindings, |b| b.allows_namespace(ns)),
        }
    }

    fn merge_all_enabled(&self, bindings: &[String]) -> EffectivePermissions {
        self.merge(bindings, |_| true)
    }
}
