use crate::circuit::state::{CallOutcome, CircuitOverride, CircuitSnapshot, CommandKey, WindowStats};
use crate::circuit::store::{minute_of, CircuitStore};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

const BUCKET_RETENTION_SECONDS: i64 = 600;

#[derive(Default)]
struct MinuteStats {
    total: AtomicU64,
    failed: AtomicU64,
    timeout: AtomicU64,
}

/// In-process store for a single instance and for tests. Minute buckets use
/// atomic counters so concurrent calls never lose an increment.
#[derive(Clone, Default)]
pub struct CircuitStoreMemory {
    snapshots: Arc<RwLock<HashMap<CommandKey, CircuitSnapshot>>>,
    stats: Arc<RwLock<HashMap<(CommandKey, i64), Arc<MinuteStats>>>>,
    overrides: Arc<RwLock<HashMap<CommandKey, CircuitOverride>>>,
}

impl CircuitStoreMemory {
    pub fn new() -> Self {
        Self::default()
    }

    async fn bucket(&self, key: &CommandKey, minute: i64) -> Arc<MinuteStats> {
        {
            let read = self.stats.read().await;
            if let Some(bucket) = read.get(&(*key, minute)) {
                return bucket.clone();
            }
        }

        let mut write = self.stats.write().await;
        write.retain(|(_, m), _| *m > minute - BUCKET_RETENTION_SECONDS);
        write.entry((*key, minute)).or_default().clone()
    }
}

#[async_trait::async_trait]
impl CircuitStore for CircuitStoreMemory {
    async fn get_snapshot(&self, key: &CommandKey) -> Result<CircuitSnapshot> {
        let read = self.snapshots.read().await;
        Ok(read.get(key).cloned().unwrap_or_else(|| CircuitSnapshot::new(*key)))
    }

    async fn save_snapshot(&self, snapshot: &CircuitSnapshot) -> Result<()> {
        let mut write = self.snapshots.write().await;
        write.insert(snapshot.key, snapshot.clone());
        Ok(())
    }

    async fn write_result(
        &self,
        key: &CommandKey,
        outcome: CallOutcome,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        let bucket = self.bucket(key, minute_of(now)).await;
        bucket.total.fetch_add(1, Ordering::SeqCst);
        match outcome {
            CallOutcome::Success => {}
            CallOutcome::Failure => {
                bucket.failed.fetch_add(1, Ordering::SeqCst);
            }
            CallOutcome::Timeout => {
                bucket.failed.fetch_add(1, Ordering::SeqCst);
                bucket.timeout.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    async fn aggregate_window(
        &self,
        key: &CommandKey,
        minutes: i64,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<WindowStats> {
        let current = minute_of(now);
        let read = self.stats.read().await;

        let mut total = 0u64;
        let mut failed = 0u64;
        let mut timeout = 0u64;
        for i in 0..minutes {
            if let Some(bucket) = read.get(&(*key, current - i * 60)) {
                total += bucket.total.load(Ordering::SeqCst);
                failed += bucket.failed.load(Ordering::SeqCst);
                timeout += bucket.timeout.load(Ordering::SeqCst);
            }
        }

        Ok(WindowStats::from_counts(total, failed, timeout))
    }

    async fn get_override(&self, key: &CommandKey) -> Result<Option<CircuitOverride>> {
        Ok(self.overrides.read().await.get(key).copied())
    }

    async fn set_override(&self, key: &CommandKey, value: CircuitOverride) -> Result<()> {
        self.overrides.write().await.insert(*key, value);
        Ok(())
    }

    async fn clear_override(&self, key: &CommandKey) -> Result<()> {
        self.overrides.write().await.remove(key);
        Ok(())
    }
}
