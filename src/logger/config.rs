/// Logger configuration derived from command-line flags
///
/// Flags understood:
/// - `--debug-<tag>`   enable DEBUG output for one tag
/// - `--verbose`       enable VERBOSE output for every tag
/// - `--verbose-<tag>` enable DEBUG and VERBOSE output for one tag
/// - `--quiet`         only show errors
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::get_cmd_args;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Highest level that may be printed
    pub min_level: LogLevel,
    /// Tags with DEBUG output enabled (`--debug-<tag>` or `--verbose-<tag>`)
    pub debug_tags: HashSet<String>,
    /// Tags with VERBOSE output enabled (`--verbose-<tag>`)
    pub verbose_tags: HashSet<String>,
    /// `--verbose`: every tag at every level
    pub verbose_all: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            verbose_all: false,
        }
    }
}

impl LoggerConfig {
    pub fn is_debug_enabled_for(&self, tag: &LogTag) -> bool {
        self.verbose_all || self.debug_tags.contains(&tag.to_debug_key())
    }

    pub fn is_verbose_enabled_for(&self, tag: &LogTag) -> bool {
        self.verbose_all || self.verbose_tags.contains(&tag.to_debug_key())
    }

    fn raise_min_level(&mut self, level: LogLevel) {
        if self.min_level < level {
            self.min_level = level;
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    match LOGGER_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(_) => LoggerConfig::default(),
    }
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

/// Build a logger configuration from an argument list
pub fn config_from_args(args: &[String]) -> LoggerConfig {
    let mut config = LoggerConfig::default();

    for tag in LogTag::all() {
        let key = tag.to_debug_key();
        if args.iter().any(|a| *a == format!("--debug-{}", key)) {
            config.debug_tags.insert(key.clone());
            config.raise_min_level(LogLevel::Debug);
        }
        // Per-tag verbose implies per-tag debug
        if args.iter().any(|a| *a == format!("--verbose-{}", key)) {
            config.debug_tags.insert(key.clone());
            config.verbose_tags.insert(key);
            config.raise_min_level(LogLevel::Verbose);
        }
    }

    if args.iter().any(|a| a == "--verbose" || a == "-v") {
        config.verbose_all = true;
        config.raise_min_level(LogLevel::Verbose);
    }
    if args.iter().any(|a| a == "--quiet" || a == "-q") {
        config.min_level = LogLevel::Error;
    }

    config
}

/// Initialize the global logger configuration from the process arguments
pub fn init_from_args() {
    set_logger_config(config_from_args(&get_cmd_args()));
}
