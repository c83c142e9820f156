use std::collections::BTreeSet;

use super::{EffectivePermissions, PermissionChecker};

/// Exact-match checker over merged permission sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checker;

impl PermissionChecker for Checker {
    fn is_known_verb(&self, verbs: &BTreeSet<String>, verb: &str) -> bool {
        verbs.contains(verb)
    }

    fn is_verb_allowed_in_ns(&self, permissions: &EffectivePermissions, verb: &str) -> bool {
        permissions.allowed_verbs.contains(verb)
    }

    fn is_resource_allowed_in_ns(
        &self,
        permissions: &EffectivePermissions,
        resource: &str,
    ) -> bool {
        permissions.allowed_resources.contains(resource)
    }
}
