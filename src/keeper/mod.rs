//! Price-gated batch keeper
//!
//! A run fetches the reference price and the job's candidates, asks the
//! decision service about each candidate, acts on the approved ones and
//! reports which candidates were acted upon.

pub mod backend;
pub mod jobs;
pub mod orchestrator;
pub mod result;
pub mod types;

pub use backend::BackendClient;
pub use jobs::{ClosePositionsJob, ExecuteOrdersJob, KeeperJob};
pub use orchestrator::{BatchOrchestrator, BatchReport};
pub use result::BatchResult;
pub use types::{BatchPhase, Candidate, CandidateId, CandidateOutcome, JobKind, Order, Position};

use crate::apis::HttpClient;
use crate::config::{Config, ResultEncoding};
use crate::errors::KeeperResult;
use crate::oracle::{ChainlinkOracle, PriceOracle};
use std::sync::Arc;

/// Build the clients for `kind` from `config` and run one batch
pub async fn run_job(config: &Config, kind: JobKind) -> KeeperResult<BatchReport> {
    config.validate()?;

    let http = HttpClient::new(config.backend.timeout_secs)?;
    let oracle: Arc<dyn PriceOracle> =
        Arc::new(ChainlinkOracle::new(&http, config.oracle.clone()));
    let backend = Arc::new(BackendClient::new(&http, &config.backend)?);

    match kind {
        JobKind::ClosePositions => {
            let job = ClosePositionsJob::new(backend, config.close_positions.clone());
            BatchOrchestrator::new(oracle, Arc::new(job), config.candidate_failures)
                .run()
                .await
        }
        JobKind::ExecuteOrders => {
            let job = ExecuteOrdersJob::new(backend, config.execute_orders.clone());
            BatchOrchestrator::new(oracle, Arc::new(job), config.candidate_failures)
                .run()
                .await
        }
    }
}

/// Configured result encoding for a job
pub fn output_encoding(config: &Config, kind: JobKind) -> ResultEncoding {
    match kind {
        JobKind::ClosePositions => config.close_positions.output,
        JobKind::ExecuteOrders => config.execute_orders.output,
    }
}
