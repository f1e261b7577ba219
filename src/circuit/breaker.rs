use crate::billers::BillerCallError;
use crate::circuit::evaluator::pre_call_decision;
use crate::circuit::state::{CallOutcome, CircuitDecision, CircuitState, CommandKey};
use crate::circuit::store::CircuitStore;
use crate::circuit::transitions::apply_transition;
use crate::repo::circuit_breaker_config_repo::{CircuitThresholds, ThresholdsSource};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct CircuitBreaker {
    store: Arc<dyn CircuitStore>,
    thresholds: Arc<dyn ThresholdsSource>,
    call_timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(store: Arc<dyn CircuitStore>, thresholds: Arc<dyn ThresholdsSource>, call_timeout: Duration) -> Self {
        Self {
            store,
            thresholds,
            call_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn CircuitStore> {
        &self.store
    }

    /// Runs `run` under the breaker for `key`. A rejected, failed or timed out
    /// call is handed to `fallback`, so the caller always gets a `T` back.
    /// Store trouble never blocks a call: the breaker then lets it through.
    pub async fn execute<T, F, Fut, FB>(&self, key: CommandKey, run: F, fallback: FB) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BillerCallError>>,
        FB: FnOnce(BillerCallError) -> T,
    {
        let now = chrono::Utc::now();
        let thresholds = match self.thresholds.get_thresholds(&key).await {
            Ok(t) => t,
            Err(e) => {
                warn!(key = %key, error = %e, "breaker thresholds unavailable, using defaults");
                CircuitThresholds::default()
            }
        };

        let decision = match self.decide(&key, &thresholds, now).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(key = %key, error = %e, "circuit store unavailable, allowing call");
                CircuitDecision::Allow
            }
        };

        let was_probe = match decision {
            CircuitDecision::Allow => false,
            CircuitDecision::Probe => true,
            CircuitDecision::Reject(reason) => {
                info!(key = %key, reason = %reason, "call rejected by circuit breaker");
                return fallback(BillerCallError::CircuitOpen(key.to_string()));
            }
        };

        let result = match tokio::time::timeout(self.call_timeout, run()).await {
            Ok(result) => result,
            Err(_) => Err(BillerCallError::Timeout {
                millis: self.call_timeout.as_millis() as u64,
            }),
        };

        let outcome = match &result {
            Ok(_) => Some(CallOutcome::Success),
            Err(e) if e.is_timeout() => Some(CallOutcome::Timeout),
            Err(e) if e.counts_as_failure() => Some(CallOutcome::Failure),
            Err(_) => None,
        };
        if let Some(outcome) = outcome {
            if let Err(e) = self.record(&key, &thresholds, outcome, was_probe).await {
                warn!(key = %key, error = %e, "failed to record call outcome");
            }
        }

        match result {
            Ok(value) => value,
            Err(e) => fallback(e),
        }
    }

    async fn decide(
        &self,
        key: &CommandKey,
        thresholds: &CircuitThresholds,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<CircuitDecision> {
        let manual_override = self.store.get_override(key).await?;
        let snapshot = self.store.get_snapshot(key).await?;
        Ok(pre_call_decision(&snapshot, thresholds, manual_override, now))
    }

    async fn record(
        &self,
        key: &CommandKey,
        thresholds: &CircuitThresholds,
        outcome: CallOutcome,
        was_probe: bool,
    ) -> Result<()> {
        let now = chrono::Utc::now();
        self.store.write_result(key, outcome, now).await?;
        let window_2m = self.store.aggregate_window(key, 2, now).await?;
        let window_5m = self.store.aggregate_window(key, 5, now).await?;

        let before = self.store.get_snapshot(key).await?;
        let previous_state = before.state;
        let after = apply_transition(before, thresholds, window_2m, window_5m, outcome, was_probe, now);

        if after.state != previous_state {
            match after.state {
                CircuitState::Open => warn!(
                    key = %key,
                    requests_2m = window_2m.requests,
                    failure_rate_2m = window_2m.failure_rate,
                    timeout_rate_5m = window_5m.timeout_rate,
                    consecutive_failures = after.consecutive_failures,
                    "circuit opened"
                ),
                CircuitState::HalfOpen => info!(key = %key, "circuit half-open"),
                CircuitState::Closed => info!(key = %key, "circuit closed"),
            }
        }

        self.store.save_snapshot(&after).await
    }
}
