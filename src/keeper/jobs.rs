/// Keeper jobs: what to list, how to ask for a verdict, and which action to
/// take. The orchestrator is generic over [`KeeperJob`] so both jobs share
/// one pipeline.
use super::backend::{parse_candidate_list, BackendClient};
use super::types::{Candidate, CandidateId, JobKind, Order, Position};
use crate::config::{ClosePositionsConfig, ExecuteOrdersConfig};
use crate::errors::KeeperResult;
use crate::logger::{self, LogTag};
use crate::oracle::Price;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[async_trait]
pub trait KeeperJob: Send + Sync + 'static {
    type Candidate: Candidate;

    fn kind(&self) -> JobKind;

    /// List the candidates for this run (already capped)
    async fn fetch_candidates(&self) -> KeeperResult<Vec<Self::Candidate>>;

    /// Ask the decision service whether to act on one candidate
    async fn evaluate(&self, candidate: &Self::Candidate, price: &Price) -> KeeperResult<bool>;

    /// Perform the remote action settled at `price`
    async fn act(&self, candidate_id: &CandidateId, price: &Price) -> KeeperResult<()>;
}

// ============================================================================
// REQUEST PAYLOADS
// ============================================================================

/// Absent attributes are sent as `null`; an absent direction is omitted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShouldCloseRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<&'a str>,
    pub entry_price: Option<f64>,
    pub current_price: Price,
    pub pnl: Option<f64>,
    pub size: Option<f64>,
    pub leverage: Option<f64>,
}

impl<'a> ShouldCloseRequest<'a> {
    pub fn new(position: &'a Position, price: &Price) -> Self {
        Self {
            direction: position.direction.as_deref(),
            entry_price: position.entry_price,
            current_price: *price,
            pnl: position.pnl,
            size: position.size,
            leverage: position.leverage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShouldExecuteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<&'a str>,
    pub amount: Option<f64>,
    pub leverage: Option<f64>,
    pub volatility: f64,
}

impl<'a> ShouldExecuteRequest<'a> {
    pub fn new(order: &'a Order, volatility: f64) -> Self {
        Self {
            direction: order.direction.as_deref(),
            amount: order.amount,
            leverage: order.leverage,
            volatility,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePositionRequest {
    pub close_price: Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteOrderRequest {
    pub entry_price: Price,
}

// ============================================================================
// CLOSE POSITIONS
// ============================================================================

/// Closes open positions the decision service flags with `shouldClose`
pub struct ClosePositionsJob {
    backend: Arc<BackendClient>,
    config: ClosePositionsConfig,
}

impl ClosePositionsJob {
    pub fn new(backend: Arc<BackendClient>, config: ClosePositionsConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait]
impl KeeperJob for ClosePositionsJob {
    type Candidate = Position;

    fn kind(&self) -> JobKind {
        JobKind::ClosePositions
    }

    async fn fetch_candidates(&self) -> KeeperResult<Vec<Position>> {
        let body = self
            .backend
            .fetch_list(&["positions", "all-opened-positions"])
            .await?;
        let positions = parse_candidate_list(&body, self.config.max_candidates, "position");
        logger::debug(
            LogTag::Backend,
            &format!("Fetched {} open positions", positions.len()),
        );
        Ok(positions)
    }

    async fn evaluate(&self, position: &Position, price: &Price) -> KeeperResult<bool> {
        let payload = ShouldCloseRequest::new(position, price);
        self.backend
            .fetch_decision(&["should-close"], &payload, "shouldClose", &position.id)
            .await
    }

    async fn act(&self, candidate_id: &CandidateId, price: &Price) -> KeeperResult<()> {
        let payload = ClosePositionRequest {
            close_price: *price,
        };
        self.backend
            .perform_action(
                &["positions", "position", candidate_id.as_str(), "close"],
                &payload,
                candidate_id,
            )
            .await
    }
}

// ============================================================================
// EXECUTE ORDERS
// ============================================================================

/// Executes pending orders the decision service flags with `shouldExecute`
pub struct ExecuteOrdersJob {
    backend: Arc<BackendClient>,
    config: ExecuteOrdersConfig,
}

impl ExecuteOrdersJob {
    pub fn new(backend: Arc<BackendClient>, config: ExecuteOrdersConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait]
impl KeeperJob for ExecuteOrdersJob {
    type Candidate = Order;

    fn kind(&self) -> JobKind {
        JobKind::ExecuteOrders
    }

    async fn fetch_candidates(&self) -> KeeperResult<Vec<Order>> {
        let body = self
            .backend
            .fetch_list(&["orders", "all-opened-orders"])
            .await?;
        let orders = parse_candidate_list(&body, self.config.max_candidates, "order");
        logger::debug(
            LogTag::Backend,
            &format!(
                "Fetched {} open orders (cap {})",
                orders.len(),
                self.config.max_candidates
            ),
        );
        Ok(orders)
    }

    /// The execute verdict does not depend on the reference price
    async fn evaluate(&self, order: &Order, _price: &Price) -> KeeperResult<bool> {
        let payload = ShouldExecuteRequest::new(order, self.config.volatility);
        self.backend
            .fetch_decision(&["should-execute"], &payload, "shouldExecute", &order.id)
            .await
    }

    async fn act(&self, candidate_id: &CandidateId, price: &Price) -> KeeperResult<()> {
        let payload = ExecuteOrderRequest {
            entry_price: *price,
        };
        self.backend
            .perform_action(
                &["orders", "order", candidate_id.as_str(), "execute"],
                &payload,
                candidate_id,
            )
            .await
    }
}
