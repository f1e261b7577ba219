use crate::circuit::state::CommandKey;
use anyhow::Result;
use sqlx::{PgPool, Row};

#[derive(Debug, Clone)]
pub struct CircuitThresholds {
    /// Requests a window must hold before its rates can open the circuit.
    pub min_request_volume_2m: u64,
    pub failure_rate_threshold_2m: f64,
    pub consecutive_failure_threshold: i32,
    pub timeout_rate_threshold_5m: f64,
    pub cooldown_seconds: i32,
    pub half_open_probe_ratio: f64,
    pub half_open_min_probe_count: i32,
    pub half_open_success_rate_close: f64,
    pub half_open_consecutive_success_close: i32,
    pub half_open_consecutive_failure_reopen: i32,
}

impl Default for CircuitThresholds {
    fn default() -> Self {
        Self {
            min_request_volume_2m: 20,
            failure_rate_threshold_2m: 0.40,
            consecutive_failure_threshold: 10,
            timeout_rate_threshold_5m: 0.50,
            cooldown_seconds: 30,
            half_open_probe_ratio: 0.10,
            half_open_min_probe_count: 5,
            half_open_success_rate_close: 0.80,
            half_open_consecutive_success_close: 5,
            half_open_consecutive_failure_reopen: 3,
        }
    }
}

#[async_trait::async_trait]
pub trait ThresholdsSource: Send + Sync {
    async fn get_thresholds(&self, key: &CommandKey) -> Result<CircuitThresholds>;
}

/// The same thresholds for every command key.
#[async_trait::async_trait]
impl ThresholdsSource for CircuitThresholds {
    async fn get_thresholds(&self, _key: &CommandKey) -> Result<CircuitThresholds> {
        Ok(self.clone())
    }
}

#[derive(Clone)]
pub struct CircuitBreakerConfigRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl ThresholdsSource for CircuitBreakerConfigRepo {
    async fn get_thresholds(&self, key: &CommandKey) -> Result<CircuitThresholds> {
        let row = sqlx::query(
            r#"
            SELECT min_request_volume_2m, failure_rate_threshold_2m, consecutive_failure_threshold, timeout_rate_threshold_5m,
                   cooldown_seconds, half_open_probe_ratio, half_open_min_probe_count,
                   half_open_success_rate_close, half_open_consecutive_success_close,
                   half_open_consecutive_failure_reopen
            FROM circuit_breaker_config WHERE biller=$1 AND operation=$2
            "#,
        )
        .bind(key.biller.as_str())
        .bind(key.operation.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            let min_request_volume_2m: i32 = row.get("min_request_volume_2m");
            Ok(CircuitThresholds {
                min_request_volume_2m: min_request_volume_2m.max(0) as u64,
                failure_rate_threshold_2m: row.get("failure_rate_threshold_2m"),
                consecutive_failure_threshold: row.get("consecutive_failure_threshold"),
                timeout_rate_threshold_5m: row.get("timeout_rate_threshold_5m"),
                cooldown_seconds: row.get("cooldown_seconds"),
                half_open_probe_ratio: row.get("half_open_probe_ratio"),
                half_open_min_probe_count: row.get("half_open_min_probe_count"),
                half_open_success_rate_close: row.get("half_open_success_rate_close"),
                half_open_consecutive_success_close: row.get("half_open_consecutive_success_close"),
                half_open_consecutive_failure_reopen: row.get("half_open_consecutive_failure_reopen"),
            })
        } else {
            Ok(CircuitThresholds::default())
        }
    }
}
