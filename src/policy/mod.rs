//! Permission model: merging bindings and checking verbs/resources.
//!
//! The executor only talks to the [`PermissionMerger`] and
//! [`PermissionChecker`] traits, so tests and alternative policy sources can
//! swap in their own implementations.

/// Default set-membership checker.
pub mod checker;
/// Config-backed binding merger with namespace pattern matching.
pub mod merger;

pub use checker::Checker;
pub use merger::BindingMerger;

use std::collections::BTreeSet;

use crate::parse::ExecutionNamespace;

/// Permissions in effect for one request after merging its bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    pub allowed_verbs: BTreeSet<String>,
    pub allowed_resources: BTreeSet<String>,
    /// Empty when no merged binding configures one.
    pub default_namespace: String,
    /// Only auth channels may run commands when set.
    pub restrict_access: bool,
}

/// Merges named bindings into [`EffectivePermissions`].
///
/// Implementations are shared between concurrently handled messages.
pub trait PermissionMerger: Send + Sync {
    /// Merge the enabled bindings that apply to `namespace`.
    fn merge_for_namespace(
        &self,
        bindings: &[String],
        namespace: &ExecutionNamespace,
    ) -> EffectivePermissions;

    /// Merge every enabled binding, ignoring namespace scoping.
    fn merge_all_enabled(&self, bindings: &[String]) -> EffectivePermissions;

    /// Verbs enabled by any of `bindings`, in any namespace.
    fn merge_all_enabled_verbs(&self, bindings: &[String]) -> BTreeSet<String> {
        self.merge_all_enabled(bindings).allowed_verbs
    }
}

/// Answers verb and resource questions against merged permissions.
pub trait PermissionChecker: Send + Sync {
    fn is_known_verb(&self, verbs: &BTreeSet<String>, verb: &str) -> bool;

    fn is_verb_allowed_in_ns(&self, permissions: &EffectivePermissions, verb: &str) -> bool;

    fn is_resource_allowed_in_ns(&self, permissions: &EffectivePermissions, resource: &str) -> bool;
}
