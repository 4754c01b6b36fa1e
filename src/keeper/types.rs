/// Candidate and outcome types for a keeper run
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CUSTOM DESERIALIZERS - Backend sends numbers and ids in mixed formats
// ============================================================================

/// Accept a JSON number or a numeric string (`"65000.5"`).
///
/// `null`, non-numeric and non-finite values decode as `None` so the entry
/// still reaches the decision service, which owns the verdict on it.
fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

// ============================================================================
// CANDIDATE ID
// ============================================================================

/// Opaque backend identifier, normalized to a string.
/// The backend may send ids as JSON strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for CandidateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CandidateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match Value::deserialize(deserializer)? {
            Value::String(s) if !s.trim().is_empty() => Ok(CandidateId(s)),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(CandidateId(n.to_string())),
            other => Err(Error::custom(format!(
                "expected non-empty string or integer id, got: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// CANDIDATES
// ============================================================================

/// Anything the orchestrator can act on
pub trait Candidate: Clone + Send + Sync + 'static {
    fn id(&self) -> &CandidateId;
}

/// Open perpetual position listed by `/positions/all-opened-positions`.
/// Only `id` is required; other attributes are forwarded as received.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: CandidateId,
    /// Side as the backend names it (e.g. `long` / `short`)
    #[serde(rename = "type", default)]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub entry_price: Option<f64>,
    /// `null` until the backend has marked the position
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub pnl: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub leverage: Option<f64>,
}

impl Candidate for Position {
    fn id(&self) -> &CandidateId {
        &self.id
    }
}

/// Pending order listed by `/orders/all-opened-orders`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: CandidateId,
    #[serde(rename = "type", default)]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub leverage: Option<f64>,
}

impl Candidate for Order {
    fn id(&self) -> &CandidateId {
        &self.id
    }
}

// ============================================================================
// JOB KIND
// ============================================================================

/// The two keeper jobs a deployment can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    ClosePositions,
    ExecuteOrders,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::ClosePositions => "close-positions",
            JobKind::ExecuteOrders => "execute-orders",
        }
    }

    /// Singular entity name used in log lines
    pub fn entity(&self) -> &'static str {
        match self {
            JobKind::ClosePositions => "position",
            JobKind::ExecuteOrders => "order",
        }
    }

    /// Verb describing the remote action
    pub fn action(&self) -> &'static str {
        match self {
            JobKind::ClosePositions => "close",
            JobKind::ExecuteOrders => "execute",
        }
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "close-positions" | "close" => Ok(JobKind::ClosePositions),
            "execute-orders" | "execute" => Ok(JobKind::ExecuteOrders),
            other => Err(format!(
                "unknown job '{}' (expected close-positions|execute-orders)",
                other
            )),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// Settled state of one candidate's sub-pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    /// Decision was "act" and the action call succeeded
    Acted,
    /// Decision was "do not act"
    Skipped,
    /// Decision or action failed, the reason is kept for diagnostics
    Failed(String),
}

impl CandidateOutcome {
    pub fn is_acted(&self) -> bool {
        matches!(self, CandidateOutcome::Acted)
    }
}

/// Orchestrator lifecycle for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Init,
    PricedAndListed,
    Processing,
    Done,
    Failed,
}

impl BatchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchPhase::Done | BatchPhase::Failed)
    }
}
