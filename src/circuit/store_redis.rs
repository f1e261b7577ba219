use crate::circuit::state::{CallOutcome, CircuitOverride, CircuitSnapshot, CommandKey, WindowStats};
use crate::circuit::store::{minute_of, CircuitStore};
use anyhow::Result;
use redis::AsyncCommands;

/// Breaker state shared across every instance of the service.
#[derive(Clone)]
pub struct CircuitStoreRedis {
    pub client: redis::Client,
}

impl CircuitStoreRedis {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn state_key(key: &CommandKey) -> String {
        format!("circuit:state:{}:{}", key.biller, key.operation)
    }

    fn minute_stats_key(key: &CommandKey, minute_epoch: i64) -> String {
        format!("circuit:stats:{}:{}:{}", key.biller, key.operation, minute_epoch)
    }

    fn override_key(key: &CommandKey) -> String {
        format!("circuit:manual_override:{}:{}", key.biller, key.operation)
    }

    async fn increment(conn: &mut redis::aio::MultiplexedConnection, key: &str, field: &str) -> Result<()> {
        let _: f64 = redis::cmd("HINCRBYFLOAT")
            .arg(key)
            .arg(field)
            .arg(1.0)
            .query_async(conn)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CircuitStore for CircuitStoreRedis {
    async fn get_snapshot(&self, key: &CommandKey) -> Result<CircuitSnapshot> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(Self::state_key(key)).await?;
        if let Some(payload) = payload {
            let parsed = serde_json::from_str::<CircuitSnapshot>(&payload)?;
            return Ok(parsed);
        }
        Ok(CircuitSnapshot::new(*key))
    }

    async fn save_snapshot(&self, snapshot: &CircuitSnapshot) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(snapshot)?;
        let _: () = conn.set(Self::state_key(&snapshot.key), payload).await?;
        Ok(())
    }

    async fn write_result(
        &self,
        key: &CommandKey,
        outcome: CallOutcome,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        let stats_key = Self::minute_stats_key(key, minute_of(now));
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        Self::increment(&mut conn, &stats_key, "total").await?;
        match outcome {
            CallOutcome::Success => Self::increment(&mut conn, &stats_key, "success").await?,
            CallOutcome::Failure => Self::increment(&mut conn, &stats_key, "failed").await?,
            CallOutcome::Timeout => {
                Self::increment(&mut conn, &stats_key, "failed").await?;
                Self::increment(&mut conn, &stats_key, "timeout").await?;
            }
        }

        let _: bool = conn.expire(&stats_key, 600).await?;
        Ok(())
    }

    async fn aggregate_window(
        &self,
        key: &CommandKey,
        minutes: i64,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<WindowStats> {
        let mut total = 0u64;
        let mut failed = 0u64;
        let mut timeout = 0u64;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let current = minute_of(now);
        for i in 0..minutes {
            let stats_key = Self::minute_stats_key(key, current - (i * 60));
            let values: std::collections::HashMap<String, String> =
                conn.hgetall(stats_key).await.unwrap_or_default();
            total += count(&values, "total");
            failed += count(&values, "failed");
            timeout += count(&values, "timeout");
        }

        Ok(WindowStats::from_counts(total, failed, timeout))
    }

    async fn get_override(&self, key: &CommandKey) -> Result<Option<CircuitOverride>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let val: Option<String> = conn.get(Self::override_key(key)).await?;
        Ok(val.as_deref().and_then(CircuitOverride::parse))
    }

    async fn set_override(&self, key: &CommandKey, value: CircuitOverride) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(Self::override_key(key), value.as_str()).await?;
        Ok(())
    }

    async fn clear_override(&self, key: &CommandKey) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: usize = conn.del(Self::override_key(key)).await?;
        Ok(())
    }
}

// Counters are written with HINCRBYFLOAT, so they read back as "3" or "3.0".
fn count(values: &std::collections::HashMap<String, String>, field: &str) -> u64 {
    values
        .get(field)
        .and_then(|v| v.parse::<f64>().ok())
        .map(|v| v.max(0.0) as u64)
        .unwrap_or(0)
}
