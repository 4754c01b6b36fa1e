/// Configuration schemas for a keeper deployment
///
/// Defaults describe the production BTC/USD deployment so a run without a
/// config file behaves like the hosted keeper scripts.
use crate::config_struct;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SHARED ENUMS
// ============================================================================

/// How the batch result is encoded for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultEncoding {
    /// Number of acted-upon candidates as a 32-byte big-endian word
    Count,
    /// JSON array of acted-upon candidate ids
    Ids,
}

impl FromStr for ResultEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" => Ok(ResultEncoding::Count),
            "ids" | "id-list" => Ok(ResultEncoding::Ids),
            other => Err(format!("unknown output encoding '{}' (expected count|ids)", other)),
        }
    }
}

impl fmt::Display for ResultEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultEncoding::Count => write!(f, "count"),
            ResultEncoding::Ids => write!(f, "ids"),
        }
    }
}

/// Diagnostics for candidates whose sub-pipeline failed.
/// Applies to every job of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateFailurePolicy {
    /// Emit a warning per failed candidate
    Log,
    /// Drop the failure without output (debug logging still applies)
    Silent,
}

// ============================================================================
// ORACLE
// ============================================================================

config_struct! {
    /// Price feed read through a JSON-RPC `eth_call`
    pub struct OracleConfig {
        /// JSON-RPC endpoint
        rpc_url: String = "https://eth.llamarpc.com".to_string(),
        /// Aggregator contract (BTC/USD on mainnet)
        contract_address: String = "0xF4030086522a5bEEa4988F8cA5B36dbC97BeE88c".to_string(),
        /// latestAnswer()
        selector: String = "0x50d25bcd".to_string(),
        /// Implied decimals of the returned answer
        decimals: u32 = 8,
        timeout_secs: u64 = 10,
    }
}

// ============================================================================
// BACKEND
// ============================================================================

config_struct! {
    pub struct BackendConfig {
        base_url: String = "https://perpetra-api.aftermiracle.com".to_string(),
        /// Per-request timeout, applies to listing, decision and action calls
        timeout_secs: u64 = 10,
    }
}

// ============================================================================
// JOBS
// ============================================================================

config_struct! {
    pub struct ClosePositionsConfig {
        /// Keep only the first N listed positions (0 = no cap)
        max_candidates: usize = 0,
        output: ResultEncoding = ResultEncoding::Count,
    }
}

config_struct! {
    pub struct ExecuteOrdersConfig {
        /// Keep only the first N listed orders (0 = no cap)
        max_candidates: usize = 3,
        /// Volatility sent to the decision service
        volatility: f64 = 1.3,
        output: ResultEncoding = ResultEncoding::Count,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration passed into every keeper component
    pub struct Config {
        oracle: OracleConfig = OracleConfig::default(),
        backend: BackendConfig = BackendConfig::default(),
        close_positions: ClosePositionsConfig = ClosePositionsConfig::default(),
        execute_orders: ExecuteOrdersConfig = ExecuteOrdersConfig::default(),
        candidate_failures: CandidateFailurePolicy = CandidateFailurePolicy::Log,
    }
}
