/// Centralized command-line argument handling
///
/// The keeper is invoked once per run by an external scheduler; arguments
/// are captured once into a process-wide store and read from there.
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Default configuration file looked up when `--config` is absent
pub const DEFAULT_CONFIG_PATH: &str = "perpkeeper.toml";

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Copy of the current arguments, the lock is not held by callers
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Value following `flag`, if any
pub fn get_arg_value(flag: &str) -> Option<String> {
    arg_value_in(&get_cmd_args(), flag)
}

/// Value following `flag` in an explicit argument list
pub fn arg_value_in(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .filter(|value| !value.starts_with("--"))
        .cloned()
}

// =============================================================================
// RUN PARAMETERS
// =============================================================================

/// Job to run (`--job close-positions|execute-orders`)
pub fn get_job_name() -> Option<String> {
    get_arg_value("--job")
}

/// Configuration file path (`--config <path>`)
pub fn get_config_path() -> String {
    get_arg_value("--config").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Result encoding override (`--output count|ids`)
pub fn get_output_override() -> Option<String> {
    get_arg_value("--output")
}

/// Optional log file (`--log-file <path>`)
pub fn get_log_file_path() -> Option<String> {
    get_arg_value("--log-file")
}

// =============================================================================
// DEBUG FLAGS
// =============================================================================

pub fn is_debug_oracle_enabled() -> bool {
    has_arg("--debug-oracle")
}

pub fn is_debug_backend_enabled() -> bool {
    has_arg("--debug-backend")
}

pub fn is_debug_keeper_enabled() -> bool {
    has_arg("--debug-keeper")
}

pub fn is_debug_config_enabled() -> bool {
    has_arg("--debug-config")
}

/// Gets a list of all enabled debug modes
pub fn get_enabled_debug_modes() -> Vec<&'static str> {
    let mut modes = Vec::new();

    if is_debug_oracle_enabled() {
        modes.push("oracle");
    }
    if is_debug_backend_enabled() {
        modes.push("backend");
    }
    if is_debug_keeper_enabled() {
        modes.push("keeper");
    }
    if is_debug_config_enabled() {
        modes.push("config");
    }
    if patterns::is_verbose_mode() {
        modes.push("verbose");
    }

    modes
}

/// Print the help menu (stdout, the run does not start)
pub fn print_help() {
    println!("perpkeeper - price-gated close/execute keeper");
    println!();
    println!("USAGE:");
    println!("    perpkeeper --job <JOB> [FLAGS]");
    println!();
    println!("JOBS:");
    println!("    close-positions           Evaluate open positions and close the approved ones");
    println!("    execute-orders            Evaluate open orders and execute the approved ones");
    println!();
    println!("FLAGS:");
    println!("    --config <path>           Configuration file (default: {})", DEFAULT_CONFIG_PATH);
    println!("    --output <count|ids>      Override the configured result encoding");
    println!("    --log-file <path>         Append plain-text logs to a file");
    println!("    --quiet, -q               Only log errors");
    println!("    --verbose, -v             Log everything including raw payloads");
    println!("    --help, -h                Show this help message");
    println!();
    println!("DEBUG FLAGS:");
    println!("    --debug-oracle            Price oracle requests and decoding");
    println!("    --debug-backend           Backend requests and responses");
    println!("    --debug-keeper            Per-candidate orchestration detail");
    println!("    --debug-config            Resolved configuration");
    println!("    --verbose-<tag>           Debug plus raw payloads for one tag");
    println!();
    println!("EXAMPLES:");
    println!("    perpkeeper --job close-positions");
    println!("    perpkeeper --job execute-orders --output ids --debug-backend");
}

/// Print enabled debug modes to stderr
pub fn print_debug_info() {
    let enabled_modes = get_enabled_debug_modes();
    if !enabled_modes.is_empty() {
        eprintln!("Enabled debug modes: {:?}", enabled_modes);
    }
}

/// Common argument patterns
pub mod patterns {
    use super::*;

    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }

    pub fn is_quiet_mode() -> bool {
        has_arg("--quiet") || has_arg("-q")
    }

    pub fn is_verbose_mode() -> bool {
        has_arg("--verbose") || has_arg("-v")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_arg_value_in() {
        let list = args(&["perpkeeper", "--job", "execute-orders", "--output", "ids"]);
        assert_eq!(arg_value_in(&list, "--job").as_deref(), Some("execute-orders"));
        assert_eq!(arg_value_in(&list, "--output").as_deref(), Some("ids"));
        assert_eq!(arg_value_in(&list, "--config"), None);
    }

    #[test]
    fn test_arg_value_in_rejects_flag_as_value() {
        let list = args(&["perpkeeper", "--job", "--debug-oracle"]);
        assert_eq!(arg_value_in(&list, "--job"), None);

        let list = args(&["perpkeeper", "--job"]);
        assert_eq!(arg_value_in(&list, "--job"), None);
    }
}
