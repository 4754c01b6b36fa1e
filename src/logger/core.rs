/// Core logging implementation with automatic filtering
///
/// Filtering decides whether a message is displayed, formatting and
/// writing are delegated to the format module.
use super::config::{get_logger_config, LoggerConfig};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be displayed
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Check against minimum log level threshold
/// 3. Debug level requires --debug-<tag>, --verbose-<tag> or --verbose
/// 4. Verbose level requires --verbose-<tag> or --verbose
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    should_log_with(&get_logger_config(), tag, level)
}

fn should_log_with(config: &LoggerConfig, tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    if level > config.min_level {
        return false;
    }

    match level {
        LogLevel::Debug => config.is_debug_enabled_for(tag),
        LogLevel::Verbose => config.is_verbose_enabled_for(tag),
        _ => true,
    }
}

/// Internal logging function with automatic filtering
pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level.as_str(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::config_from_args;

    fn config(flags: &[&str]) -> LoggerConfig {
        let args: Vec<String> = std::iter::once("perpkeeper")
            .chain(flags.iter().copied())
            .map(str::to_string)
            .collect();
        config_from_args(&args)
    }

    #[test]
    fn test_errors_always_pass() {
        let quiet = config(&["--quiet"]);
        assert!(should_log_with(&quiet, &LogTag::Keeper, LogLevel::Error));
        assert!(!should_log_with(&quiet, &LogTag::Keeper, LogLevel::Info));
    }

    #[test]
    fn test_debug_requires_tag_flag() {
        let other = config(&["--debug-backend"]);
        assert!(!should_log_with(&other, &LogTag::Oracle, LogLevel::Debug));

        let oracle = config(&["--debug-oracle"]);
        assert!(should_log_with(&oracle, &LogTag::Oracle, LogLevel::Debug));
        assert!(!should_log_with(&oracle, &LogTag::Oracle, LogLevel::Verbose));
        assert!(should_log_with(&oracle, &LogTag::Backend, LogLevel::Info));
    }

    #[test]
    fn test_verbose_tag_shows_verbose_and_debug_lines() {
        let oracle = config(&["--verbose-oracle"]);
        assert!(should_log_with(&oracle, &LogTag::Oracle, LogLevel::Verbose));
        assert!(should_log_with(&oracle, &LogTag::Oracle, LogLevel::Debug));
        assert!(!should_log_with(&oracle, &LogTag::Backend, LogLevel::Verbose));
        assert!(!should_log_with(&oracle, &LogTag::Backend, LogLevel::Debug));
    }

    #[test]
    fn test_quiet_silences_verbose_tag() {
        let quiet = config(&["--verbose-oracle", "--quiet"]);
        assert!(!should_log_with(&quiet, &LogTag::Oracle, LogLevel::Verbose));
        assert!(!should_log_with(&quiet, &LogTag::Oracle, LogLevel::Warning));
    }
}
