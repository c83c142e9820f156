use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    /// Named kubectl permission groups, referenced from channels.
    #[serde(default)]
    pub bindings: BTreeMap<String, KubectlBinding>,
    /// Chat channels keyed by conversation ID.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Settings {
    /// Name of the cluster this relay runs against; shown in every reply.
    #[serde(default)]
    pub cluster_name: String,
    /// Name the bot answers to in `@<bot_name>` mentions.
    #[serde(default)]
    pub bot_name: String,
    /// Binary spawned for allowed commands.
    #[serde(default)]
    pub kubectl_binary: String,
    /// Prefixes stripped before the verb, e.g. `kc get pods`.
    #[serde(default)]
    pub kubectl_aliases: Vec<String>,
    #[serde(default)]
    pub log_level: String,
    /// Log file path; `~` is expanded. Empty disables file logging.
    #[serde(default)]
    pub log_file: String,
}

/// One named group of kubectl permissions.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct KubectlBinding {
    #[serde(default)]
    pub enabled: bool,
    /// Namespace used when a command names none.
    #[serde(default)]
    pub default_namespace: String,
    /// When set, only auth channels may run commands through this binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_access: Option<bool>,
    #[serde(default)]
    pub namespaces: NamespacesConfig,
    #[serde(default)]
    pub commands: KubectlCommands,
}

/// Namespace patterns: exact names or anchored regular expressions.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct NamespacesConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct KubectlCommands {
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Bindings granted to this channel, merged in order.
    #[serde(default)]
    pub bindings: Vec<String>,
    /// Initial notification state for the channel.
    #[serde(default)]
    pub notifications: bool,
    /// Auth channels may use bindings with `restrict_access = true`.
    #[serde(default)]
    pub auth: bool,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    remove_bindings: Vec<String>,
    #[serde(default)]
    remove_channels: Vec<String>,
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    bindings: BTreeMap<String, KubectlBinding>,
    #[serde(default)]
    channels: BTreeMap<String, ChannelConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    cluster_name: Option<String>,
    bot_name: Option<String>,
    kubectl_binary: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default)]
    replace_kubectl_aliases: bool,
    #[serde(default)]
    kubectl_aliases: Vec<String>,
    #[serde(default)]
    remove_kubectl_aliases: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

/// Merge named entries: removals first, then overlay entries replace whole.
fn merge_named<T>(base: &mut BTreeMap<String, T>, add: BTreeMap<String, T>, remove: &[String]) {
    base.retain(|name, _| !remove.contains(name));
    base.extend(add);
}

fn set_if_some(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/kubegate/config.toml (if exists)
    ///
    /// A missing overlay is fine; an unreadable or invalid one is an error.
    pub fn load() -> Result<Self, Error> {
        match Self::default_overlay_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default_config()),
        }
    }

    /// Load the embedded defaults merged with the overlay at `path`.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: display.clone(),
            source,
        })?;
        let overlay: ConfigOverlay = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: display,
            source,
        })?;

        let mut config = Self::default_config();
        config.apply_overlay(overlay);
        Ok(config)
    }

    /// ~/.config/kubegate/config.toml, when HOME is known.
    pub fn default_overlay_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/kubegate/config.toml"))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up a channel by conversation ID.
    pub fn channel(&self, id: &str) -> Option<&ChannelConfig> {
        self.channels.get(id)
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        set_if_some(&mut self.settings.cluster_name, s.cluster_name);
        set_if_some(&mut self.settings.bot_name, s.bot_name);
        set_if_some(&mut self.settings.kubectl_binary, s.kubectl_binary);
        set_if_some(&mut self.settings.log_level, s.log_level);
        set_if_some(&mut self.settings.log_file, s.log_file);
        merge_list(
            &mut self.settings.kubectl_aliases,
            s.kubectl_aliases,
            &s.remove_kubectl_aliases,
            s.replace_kubectl_aliases,
        );

        merge_named(&mut self.bindings, overlay.bindings, &overlay.remove_bindings);
        merge_named(&mut self.channels, overlay.channels, &overlay.remove_channels);
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert!(!config.settings.cluster_name.is_empty());
        assert!(!config.settings.kubectl_binary.is_empty());
        assert!(!config.bindings.is_empty());
        assert!(!config.channels.is_empty());
    }

    #[test]
    fn default_aliases() {
        let config = Config::default_config();
        assert_eq!(config.settings.kubectl_aliases, vec!["kubectl", "kc", "k"]);
    }

    #[test]
    fn default_read_only_binding() {
        let config = Config::default_config();
        let ro = &config.bindings["kubectl-read-only"];
        assert!(ro.enabled);
        assert!(ro.commands.verbs.contains(&"get".to_string()));
        assert!(ro.commands.resources.contains(&"pods".to_string()));
        assert!(!ro.commands.resources.contains(&"secrets".to_string()));
        assert_eq!(ro.restrict_access, Some(false));
    }

    #[test]
    fn default_write_binding_disabled() {
        let config = Config::default_config();
        assert!(!config.bindings["kubectl-write"].enabled);
    }

    #[test]
    fn default_channel_uses_read_only() {
        let config = Config::default_config();
        let general = config.channel("general").unwrap();
        assert_eq!(general.bindings, vec!["kubectl-read-only"]);
        assert!(!general.auth);
    }

    // ── Merge semantics ──

    #[test]
    fn overlay_overrides_scalars() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            cluster_name = "prod"
            kubectl_binary = "/usr/local/bin/kubectl"
        "#,
        );
        assert_eq!(config.settings.cluster_name, "prod");
        assert_eq!(config.settings.kubectl_binary, "/usr/local/bin/kubectl");
        // Untouched scalars keep defaults
        assert_eq!(config.settings.bot_name, "kubegate");
    }

    #[test]
    fn overlay_extends_aliases() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            kubectl_aliases = ["kube", "kc"]
            remove_kubectl_aliases = ["k"]
        "#,
        );
        assert_eq!(config.settings.kubectl_aliases, vec!["kubectl", "kc", "kube"]);
    }

    #[test]
    fn overlay_replaces_aliases() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            replace_kubectl_aliases = true
            kubectl_aliases = ["kube"]
        "#,
        );
        assert_eq!(config.settings.kubectl_aliases, vec!["kube"]);
    }

    #[test]
    fn overlay_adds_binding() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [bindings.secrets-reader]
            enabled = true
            default_namespace = "vault"
            namespaces.include = ["vault"]
            commands.verbs = ["get"]
            commands.resources = ["secrets"]
        "#,
        );
        let b = &config.bindings["secrets-reader"];
        assert_eq!(b.default_namespace, "vault");
        assert_eq!(b.namespaces.include, vec!["vault"]);
        assert_eq!(b.restrict_access, None);
        assert!(config.bindings.contains_key("kubectl-read-only"));
    }

    #[test]
    fn overlay_replaces_binding_whole() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [bindings.kubectl-read-only]
            enabled = true
            commands.verbs = ["get"]
        "#,
        );
        let ro = &config.bindings["kubectl-read-only"];
        assert_eq!(ro.commands.verbs, vec!["get"]);
        assert!(ro.commands.resources.is_empty());
        assert!(ro.namespaces.include.is_empty());
    }

    #[test]
    fn overlay_removes_entries() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            remove_bindings = ["kubectl-write"]
            remove_channels = ["general"]
        "#,
        );
        assert!(!config.bindings.contains_key("kubectl-write"));
        assert!(config.channel("general").is_none());
    }

    #[test]
    fn overlay_adds_channel() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [channels.ops]
            bindings = ["kubectl-read-only", "kubectl-write"]
            auth = true
        "#,
        );
        let ops = config.channel("ops").unwrap();
        assert!(ops.auth);
        assert!(!ops.notifications);
        assert!(config.channel("general").is_some());
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let original = Config::default_config();
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.bindings, original.bindings);
        assert_eq!(config.channels, original.channels);
        assert_eq!(config.settings.kubectl_aliases, original.settings.kubectl_aliases);
    }

    #[test]
    fn to_toml_round_trips_bindings() {
        let config = Config::default_config();
        let rendered = config.to_toml().unwrap();
        let back: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(back.bindings, config.bindings);
    }

    #[test]
    fn load_from_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/kubegate.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn load_from_invalid_file() {
        let path =
            std::env::temp_dir().join(format!("kubegate-invalid-{}.toml", std::process::id()));
        std::fs::write(&path, "[settings\ncluster_name = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, Error::ConfigParse { .. }));
    }
}
