use crate::billers::OperationType;
use crate::domain::biller_settings::BillerName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Breaker identity: one circuit per biller and operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandKey {
    pub biller: BillerName,
    pub operation: OperationType,
}

impl CommandKey {
    pub fn new(biller: BillerName, operation: OperationType) -> Self {
        Self { biller, operation }
    }

    /// Parses `biller:operation`, the form operators type.
    pub fn parse(value: &str) -> Option<Self> {
        let (biller, operation) = value.split_once(':')?;
        Some(Self {
            biller: biller.parse().ok()?,
            operation: OperationType::parse(operation)?,
        })
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.biller, self.operation)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Outcome counts over a window of minute buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowStats {
    pub requests: u64,
    pub failure_rate: f64,
    pub timeout_rate: f64,
}

impl WindowStats {
    pub fn from_counts(requests: u64, failed: u64, timeout: u64) -> Self {
        if requests == 0 {
            return Self::default();
        }
        Self {
            requests,
            failure_rate: failed as f64 / requests as f64,
            timeout_rate: timeout as f64 / requests as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitSnapshot {
    pub key: CommandKey,
    pub state: CircuitState,
    pub failure_rate_2m: f64,
    pub timeout_rate_5m: f64,
    pub consecutive_failures: i32,
    pub opened_at: Option<chrono::DateTime<chrono::Utc>>,
    pub cooldown_until: Option<chrono::DateTime<chrono::Utc>>,
    pub probe_total: i32,
    pub probe_success: i32,
    pub probe_failure_streak: i32,
    pub success_streak: i32,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl CircuitSnapshot {
    pub fn new(key: CommandKey) -> Self {
        Self {
            key,
            state: CircuitState::Closed,
            failure_rate_2m: 0.0,
            timeout_rate_5m: 0.0,
            consecutive_failures: 0,
            opened_at: None,
            cooldown_until: None,
            probe_total: 0,
            probe_success: 0,
            probe_failure_streak: 0,
            success_streak: 0,
            updated_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitDecision {
    Allow,
    Probe,
    Reject(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Success,
    Failure,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitOverride {
    ForceOpen,
    ForceClosed,
}

impl CircuitOverride {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitOverride::ForceOpen => "FORCE_OPEN",
            CircuitOverride::ForceClosed => "FORCE_CLOSED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FORCE_OPEN" => Some(CircuitOverride::ForceOpen),
            "FORCE_CLOSED" => Some(CircuitOverride::ForceClosed),
            _ => None,
        }
    }
}
