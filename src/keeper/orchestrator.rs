/// Batch orchestration for one keeper invocation
///
/// Init -> PricedAndListed -> Processing -> Done, or Failed when the price or
/// the candidate list cannot be obtained. Candidate sub-pipelines run as
/// independent tasks; their failures are recorded as outcomes and never abort
/// the batch.
use super::jobs::KeeperJob;
use super::result::BatchResult;
use super::types::{BatchPhase, Candidate, CandidateId, CandidateOutcome, JobKind};
use crate::config::CandidateFailurePolicy;
use crate::errors::{KeeperError, KeeperResult};
use crate::logger::{self, LogTag};
use crate::oracle::{Price, PriceOracle};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

/// Everything a finished run knows; only `result()` is reported to the caller
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub job: JobKind,
    pub price: Price,
    /// One entry per listed candidate, in listing order
    pub outcomes: Vec<(CandidateId, CandidateOutcome)>,
}

impl BatchReport {
    pub fn result(&self) -> BatchResult {
        BatchResult::from_outcomes(&self.outcomes)
    }

    pub fn acted(&self) -> usize {
        self.count(|o| o.is_acted())
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CandidateOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CandidateOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&CandidateOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

pub struct BatchOrchestrator<J: KeeperJob> {
    oracle: Arc<dyn PriceOracle>,
    job: Arc<J>,
    failure_policy: CandidateFailurePolicy,
}

impl<J: KeeperJob> BatchOrchestrator<J> {
    pub fn new(
        oracle: Arc<dyn PriceOracle>,
        job: Arc<J>,
        failure_policy: CandidateFailurePolicy,
    ) -> Self {
        Self {
            oracle,
            job,
            failure_policy,
        }
    }

    /// Run one batch. Only price and listing failures are returned as errors.
    pub async fn run(&self) -> KeeperResult<BatchReport> {
        let kind = self.job.kind();
        let started = Instant::now();
        log_phase(kind, BatchPhase::Init, "fetching price and candidates");

        let (price, candidates) =
            match tokio::try_join!(self.oracle.fetch_price(), self.job.fetch_candidates()) {
                Ok(inputs) => inputs,
                Err(e) => {
                    log_phase(kind, BatchPhase::Failed, &e.to_string());
                    return Err(e);
                }
            };

        log_phase(
            kind,
            BatchPhase::PricedAndListed,
            &format!("reference price {} with {} {}(s)", price, candidates.len(), kind.entity()),
        );

        let outcomes = if candidates.is_empty() {
            Vec::new()
        } else {
            log_phase(kind, BatchPhase::Processing, &format!("{} candidate(s)", candidates.len()));
            self.process_all(candidates, price).await
        };

        let report = BatchReport {
            job: kind,
            price,
            outcomes,
        };

        log_phase(
            kind,
            BatchPhase::Done,
            &format!(
                "{} acted, {} skipped, {} failed in {} ms",
                report.acted(),
                report.skipped(),
                report.failed(),
                started.elapsed().as_millis()
            ),
        );

        Ok(report)
    }

    /// Spawn one task per candidate and wait for every task to settle
    async fn process_all(
        &self,
        candidates: Vec<J::Candidate>,
        price: Price,
    ) -> Vec<(CandidateId, CandidateOutcome)> {
        let mut ids = Vec::with_capacity(candidates.len());
        let mut tasks = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            ids.push(candidate.id().clone());
            let job = Arc::clone(&self.job);
            tasks.push(tokio::spawn(async move {
                process_candidate(job.as_ref(), &candidate, &price).await
            }));
        }

        let results = join_all(tasks).await;

        ids.into_iter()
            .zip(results)
            .map(|(id, result)| {
                let (outcome, escalate) = match result {
                    Ok(Ok(true)) => (CandidateOutcome::Acted, false),
                    Ok(Ok(false)) => (CandidateOutcome::Skipped, false),
                    Ok(Err(e)) => (CandidateOutcome::Failed(e.to_string()), e.is_fatal()),
                    Err(join_error) => (
                        CandidateOutcome::Failed(
                            KeeperError::TaskAborted(join_error.to_string()).to_string(),
                        ),
                        false,
                    ),
                };
                self.report_outcome(&id, &outcome, &price, escalate);
                (id, outcome)
            })
            .collect()
    }

    /// `escalate` marks failures of a run-wide class (e.g. configuration),
    /// which are logged as errors under every policy
    fn report_outcome(
        &self,
        id: &CandidateId,
        outcome: &CandidateOutcome,
        price: &Price,
        escalate: bool,
    ) {
        let kind = self.job.kind();
        match outcome {
            CandidateOutcome::Acted => logger::info(
                LogTag::Keeper,
                &format!("{} {}: {} at {}", capitalize(kind.entity()), id, kind.action(), price),
            ),
            CandidateOutcome::Skipped => logger::debug(
                LogTag::Keeper,
                &format!("{} {}: decision is do not {}", capitalize(kind.entity()), id, kind.action()),
            ),
            CandidateOutcome::Failed(reason) => {
                let message = format!(
                    "{} {} failed to {}: {}",
                    capitalize(kind.entity()),
                    id,
                    kind.action(),
                    reason
                );
                match self.failure_policy {
                    _ if escalate => logger::error(LogTag::Keeper, &message),
                    CandidateFailurePolicy::Log => logger::warning(LogTag::Keeper, &message),
                    CandidateFailurePolicy::Silent => logger::debug(LogTag::Keeper, &message),
                }
            }
        }
    }
}

/// Decision then, only on "act", the action
async fn process_candidate<J: KeeperJob>(
    job: &J,
    candidate: &J::Candidate,
    price: &Price,
) -> KeeperResult<bool> {
    if !job.evaluate(candidate, price).await? {
        return Ok(false);
    }
    job.act(candidate.id(), price).await?;
    Ok(true)
}

fn log_phase(kind: JobKind, phase: BatchPhase, detail: &str) {
    let message = format!("[{}] {:?}: {}", kind, phase, detail);
    match phase {
        BatchPhase::Failed => logger::error(LogTag::Keeper, &message),
        phase if phase.is_terminal() => logger::info(LogTag::Keeper, &message),
        _ => logger::debug(LogTag::Keeper, &message),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
