//! kubectl authorization and execution.
//!
//! A command passes through these checks in order, and the first failing one
//! produces the reply:
//! 1. Restricted bindings require an auth channel
//! 2. The verb must be allowed in the execution namespace
//! 3. The resource (if the verb takes one) must start with a letter and be allowed
//!
//! Commands that pass are stripped of flags the relay cannot honour
//! (streaming, `--cluster-name`) and run through the [`CommandRunner`].

use std::sync::Arc;

use super::runner::{CommandRunner, ProcessRunner};
use crate::config::Config;
use crate::error::Error;
use crate::eval::{AuthDecision, CommandContext};
use crate::parse::flags::CLUSTER_NAME_FLAG;
use crate::parse::{self, ExecutionNamespace, NamespaceResolution, Tokenizer};
use crate::policy::{
    BindingMerger, Checker, EffectivePermissions, PermissionChecker, PermissionMerger,
};

/// Namespace used when neither the command nor any binding names one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Verbs that do not take a resource kind as their first argument, e.g.
/// `kubectl logs foo` or `kubectl cluster-info`.
pub const RESOURCELESS_VERBS: &[&str] = &[
    "exec",
    "logs",
    "attach",
    "auth",
    "api-versions",
    "cluster-info",
    "cordon",
    "drain",
    "uncordon",
    "run",
];

const FOLLOW_FLAG: &str = "--follow";
const ABBR_FOLLOW_FLAG: &str = "-f";
const WATCH_FLAG: &str = "--watch";
const ABBR_WATCH_FLAG: &str = "-w";

const FLAG_AFTER_VERB_MSG: &str = "Please specify the resource name after the verb, and all flags after the resource name. Format <verb> <resource> [flags]";

fn not_authorized_msg(cluster: &str) -> String {
    format!("Sorry, this channel is not authorized to execute kubectl command on cluster '{cluster}'.")
}

fn verb_not_allowed_msg(verb: &str, ns: &ExecutionNamespace, cluster: &str) -> String {
    match ns {
        ExecutionNamespace::All => format!(
            "Sorry, the kubectl '{verb}' command cannot be executed for all Namespaces on cluster '{cluster}'. Use 'commands list' to see allowed commands."
        ),
        ExecutionNamespace::Named(ns) => format!(
            "Sorry, the kubectl '{verb}' command cannot be executed in the '{ns}' Namespace on cluster '{cluster}'. Use 'commands list' to see allowed commands."
        ),
    }
}

fn resource_not_allowed_msg(resource: &str, ns: &ExecutionNamespace, cluster: &str) -> String {
    match ns {
        ExecutionNamespace::All => format!(
            "Sorry, the kubectl command is not authorized to work with '{resource}' resources for all Namespaces on cluster '{cluster}'. Use 'commands list' to see allowed commands."
        ),
        ExecutionNamespace::Named(ns) => format!(
            "Sorry, the kubectl command is not authorized to work with '{resource}' resources in the '{ns}' Namespace on cluster '{cluster}'. Use 'commands list' to see allowed commands."
        ),
    }
}

/// Authorizes kubectl commands and runs the allowed ones.
///
/// Holds no per-request state, so one executor serves concurrent messages.
pub struct KubectlExecutor {
    tokenizer: Tokenizer,
    binary: String,
    merger: Arc<dyn PermissionMerger>,
    checker: Arc<dyn PermissionChecker>,
    runner: Arc<dyn CommandRunner>,
}

impl KubectlExecutor {
    pub fn new(
        tokenizer: Tokenizer,
        binary: impl Into<String>,
        merger: Arc<dyn PermissionMerger>,
        checker: Arc<dyn PermissionChecker>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            tokenizer,
            binary: binary.into(),
            merger,
            checker,
            runner,
        }
    }

    /// Build an executor backed by config bindings and the real kubectl binary.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Tokenizer::new(config.settings.kubectl_aliases.iter().cloned()),
            config.settings.kubectl_binary.clone(),
            Arc::new(BindingMerger::from_config(&config.bindings)),
            Arc::new(Checker),
            Arc::new(ProcessRunner),
        )
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Whether the verb of `args` (alias ignored) is enabled by any of `bindings`.
    pub fn can_handle(&self, bindings: &[String], args: &[String]) -> bool {
        if args.is_empty() {
            return false;
        }
        let verb = self.tokenizer.verb(args);
        self.checker
            .is_known_verb(&self.merger.merge_all_enabled_verbs(bindings), verb)
    }

    /// Decide whether `command` may run, without running it.
    ///
    /// Only parse failures are errors; policy denials come back as
    /// [`AuthDecision::Denied`].
    pub fn authorize(
        &self,
        bindings: &[String],
        command: &str,
        is_auth_channel: bool,
        cluster_name: &str,
    ) -> Result<AuthDecision, Error> {
        log::debug!("Handling command {command:?} (auth channel: {is_auth_channel})");

        let CommandContext {
            mut args,
            verb,
            resource,
            namespace,
        } = CommandContext::parse(&self.tokenizer, command)?;

        let execution_ns = match namespace {
            NamespaceResolution::AllNamespaces => ExecutionNamespace::All,
            NamespaceResolution::Explicit(ns) => ExecutionNamespace::Named(ns),
            NamespaceResolution::Unspecified => {
                let ns = self.find_default_namespace(bindings);
                args = add_namespace_flag(args, &ns);
                ExecutionNamespace::Named(ns)
            }
        };

        log::debug!("Execution namespace for {verb:?}: {execution_ns}");
        let permissions = self.merger.merge_for_namespace(bindings, &execution_ns);

        if !is_auth_channel && permissions.restrict_access {
            let msg = not_authorized_msg(cluster_name);
            return Ok(AuthDecision::Denied(filter_for_cluster(
                command,
                &msg,
                cluster_name,
            )));
        }

        if !self.checker.is_verb_allowed_in_ns(&permissions, &verb) {
            return Ok(AuthDecision::Denied(verb_not_allowed_msg(
                &verb,
                &execution_ns,
                cluster_name,
            )));
        }

        let resourceless = RESOURCELESS_VERBS.contains(&verb.as_str());
        if !resourceless && !resource.is_empty() {
            if !valid_resource_name(&resource) {
                return Ok(AuthDecision::Denied(FLAG_AFTER_VERB_MSG.to_string()));
            }
            if !self.checker.is_resource_allowed_in_ns(&permissions, &resource) {
                return Ok(AuthDecision::Denied(resource_not_allowed_msg(
                    &resource,
                    &execution_ns,
                    cluster_name,
                )));
            }
        }

        Ok(AuthDecision::Allowed(sanitize(&args)))
    }

    /// Authorize `command` and, when allowed, run it.
    ///
    /// The reply is always chat-displayable: a denial, kubectl's output, or
    /// kubectl's output followed by the failure reason.
    pub fn execute(
        &self,
        bindings: &[String],
        command: &str,
        is_auth_channel: bool,
        cluster_name: &str,
    ) -> Result<String, Error> {
        let decision = self.authorize(bindings, command, is_auth_channel, cluster_name)?;
        log::debug!("kubectl decision for {command:?}: {}", decision.as_str());

        let args = match decision {
            AuthDecision::Denied(msg) => return Ok(msg),
            AuthDecision::Allowed(args) => args,
        };

        match self.runner.run_combined_output(&self.binary, &args) {
            Ok(out) => Ok(out),
            Err(err) => {
                log::warn!("{} {} failed: {err}", self.binary, args.join(" "));
                Ok(format!("{}{err}", err.output()))
            }
        }
    }

    /// Everything `bindings` enable, ignoring namespace scoping.
    pub fn enabled_permissions(&self, bindings: &[String]) -> EffectivePermissions {
        self.merger.merge_all_enabled(bindings)
    }

    /// Default namespace across all enabled bindings, or [`DEFAULT_NAMESPACE`].
    fn find_default_namespace(&self, bindings: &[String]) -> String {
        let merged = self.enabled_permissions(bindings);
        if merged.default_namespace.is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            merged.default_namespace
        }
    }
}

fn add_namespace_flag(args: Vec<String>, namespace: &str) -> Vec<String> {
    let mut out = vec!["-n".to_string(), namespace.to_string()];
    out.extend(parse::delete_double_whitespace(args));
    out
}

/// Resource names start with a letter; anything else is usually a flag
/// typed before the resource.
pub fn valid_resource_name(resource: &str) -> bool {
    resource.chars().next().is_some_and(char::is_alphabetic)
}

/// Suppress `message` when the command explicitly targets another cluster.
///
/// Keeps channels shared by several clusters free of denials meant for
/// someone else.
pub fn filter_for_cluster(command: &str, message: &str, cluster_name: &str) -> String {
    match parse::cluster_name_from_command(command) {
        Some(target) if target != cluster_name => {
            log::debug!("Skipping kubectl verbose message for cluster {target:?}: {message}");
            String::new()
        }
        _ => message.to_string(),
    }
}

/// Remove streaming flags and `--cluster-name` (with its value).
pub fn sanitize(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut skip_value = false;

    for arg in args {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg == ABBR_FOLLOW_FLAG || arg.starts_with(FOLLOW_FLAG) {
            continue;
        }
        if arg == ABBR_WATCH_FLAG || arg.starts_with(WATCH_FLAG) {
            continue;
        }
        if arg.starts_with(CLUSTER_NAME_FLAG) {
            skip_value = arg == CLUSTER_NAME_FLAG;
            continue;
        }
        out.push(arg.clone());
    }

    out
}
