use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use crate::config::Settings;

/// Target used for the one-line-per-message decision records.
pub const DECISION_TARGET: &str = "kubegate::decision";

/// Install the global logger.
///
/// Appends to `settings.log_file` (`~` expanded) and, when `verbose`, also
/// writes debug output to stderr. Best-effort: an unwritable log file never
/// blocks a reply, it just goes unlogged.
pub fn init(settings: &Settings, verbose: bool) {
    let level = parse_level(&settings.log_level);
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if let Some(file) = log_path(&settings.log_file).and_then(open_log) {
        loggers.push(WriteLogger::new(level, config.clone(), file));
    }
    if verbose {
        loggers.push(TermLogger::new(
            LevelFilter::Debug,
            config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    let _ = CombinedLogger::init(loggers);
}

/// Record how a message was handled.
///
/// `label` is the anonymized command; the reply is flattened to one line
/// and truncated.
pub fn log_decision(channel: &str, label: &str, reply: &str) {
    let reply_oneline = reply.replace('\n', "; ");
    let reply_truncated: String = reply_oneline.chars().take(200).collect();
    log::info!(target: DECISION_TARGET, "{channel}\t{label}\t{reply_truncated}");
}

/// Parse a level name, falling back to `info`.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

fn log_path(configured: &str) -> Option<PathBuf> {
    if configured.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(shellexpand::tilde(configured.trim()).into_owned()))
}

fn open_log(path: PathBuf) -> Option<File> {
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
