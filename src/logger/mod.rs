//! Structured logging for perpkeeper
//!
//! - Standard levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via `--debug-<tag>` and `--verbose-<tag>` flags
//! - Colored console output on stderr plus an optional `--log-file` sink
//!
//! ## Usage
//!
//! ```rust
//! use perpkeeper::logger::{self, LogTag};
//!
//! logger::info(LogTag::Keeper, "Batch started");
//! logger::debug(LogTag::Oracle, "eth_call payload: ..."); // Only with --debug-oracle
//! ```
//!
//! Call [`init`] once at startup before logging.

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger from command-line flags and open the file sink
/// when `--log-file <path>` is given.
pub fn init() {
    config::init_from_args();
    file::init_file_logging(crate::arguments::get_log_file_path().as_deref());
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (only with `--debug-<tag>` or `--verbose`)
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (only with `--verbose` or `--verbose-<tag>`)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Flush pending file writes, call before exiting
pub fn flush() {
    file::flush_file_logging();
}
