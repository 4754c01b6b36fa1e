/// Error types for a keeper run
///
/// Errors split into two groups:
/// - fatal: the run aborts without a result (oracle, listing, configuration)
/// - per-candidate: contained in one candidate's sub-pipeline, never propagated
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeeperError {
    #[error("Oracle unavailable: {reason}")]
    OracleUnavailable { reason: String },

    #[error("Invalid oracle price '{raw}': {reason}")]
    InvalidPrice { raw: String, reason: String },

    #[error("Candidate list unavailable from {endpoint}: {reason}")]
    CandidateListUnavailable { endpoint: String, reason: String },

    #[error("Malformed decision for candidate {candidate_id}: {reason}")]
    MalformedDecision { candidate_id: String, reason: String },

    #[error("Decision service unavailable for candidate {candidate_id}: {reason}")]
    DecisionUnavailable { candidate_id: String, reason: String },

    #[error("Action failed for candidate {candidate_id}: {reason}")]
    ActionFailed { candidate_id: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Candidate task aborted: {0}")]
    TaskAborted(String),
}

impl KeeperError {
    /// Fatal errors abort the whole run; everything else is scoped to one candidate
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KeeperError::OracleUnavailable { .. }
                | KeeperError::InvalidPrice { .. }
                | KeeperError::CandidateListUnavailable { .. }
                | KeeperError::Configuration(_)
        )
    }

    pub fn oracle_unavailable(reason: impl Into<String>) -> Self {
        KeeperError::OracleUnavailable {
            reason: reason.into(),
        }
    }

    pub fn invalid_price(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        KeeperError::InvalidPrice {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        KeeperError::Configuration(message.into())
    }
}

impl From<reqwest::Error> for KeeperError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            KeeperError::Http(format!("request timed out: {}", err))
        } else {
            KeeperError::Http(format!("request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for KeeperError {
    fn from(err: serde_json::Error) -> Self {
        KeeperError::Parse(format!("JSON: {}", err))
    }
}

pub type KeeperResult<T> = Result<T, KeeperError>;
