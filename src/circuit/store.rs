use crate::circuit::state::{CallOutcome, CircuitOverride, CircuitSnapshot, CommandKey, WindowStats};
use anyhow::Result;

/// Shared breaker state. Every in-flight call for a key reads and writes
/// the same store, so counters must tolerate concurrent increments.
#[async_trait::async_trait]
pub trait CircuitStore: Send + Sync {
    async fn get_snapshot(&self, key: &CommandKey) -> Result<CircuitSnapshot>;

    async fn save_snapshot(&self, snapshot: &CircuitSnapshot) -> Result<()>;

    async fn write_result(&self, key: &CommandKey, outcome: CallOutcome, now: chrono::DateTime<chrono::Utc>)
        -> Result<()>;

    /// Request volume, failure rate and timeout rate over the last `minutes`
    /// minute buckets.
    async fn aggregate_window(
        &self,
        key: &CommandKey,
        minutes: i64,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<WindowStats>;

    async fn get_override(&self, key: &CommandKey) -> Result<Option<CircuitOverride>>;

    async fn set_override(&self, key: &CommandKey, value: CircuitOverride) -> Result<()>;

    async fn clear_override(&self, key: &CommandKey) -> Result<()>;
}

pub(crate) fn minute_of(now: chrono::DateTime<chrono::Utc>) -> i64 {
    let ts = now.timestamp();
    ts - ts.rem_euclid(60)
}
