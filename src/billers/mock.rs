use crate::billers::{BillerCallError, BillerClient, BillerCommand, OperationType, RawExchange};
use crate::domain::biller_settings::BillerName;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const BUNDLED_RESPONSES: &str = include_str!("../../config/mock_responses.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Bundled approval for the biller and operation.
    Approve,
    /// Fixed response body for every call.
    Respond(String),
    AlwaysFailure,
    AlwaysTimeout,
}

impl MockBehavior {
    pub fn parse(value: &str) -> Self {
        match value {
            "ALWAYS_FAILURE" => MockBehavior::AlwaysFailure,
            "ALWAYS_TIMEOUT" => MockBehavior::AlwaysTimeout,
            _ => MockBehavior::Approve,
        }
    }
}

pub struct MockBillerClient {
    pub biller: BillerName,
    pub behavior: MockBehavior,
    responses: HashMap<String, Value>,
    calls: AtomicUsize,
}

impl MockBillerClient {
    pub fn new(biller: BillerName, behavior: MockBehavior) -> Result<Self> {
        let all: HashMap<String, HashMap<String, Value>> =
            serde_json::from_str(BUNDLED_RESPONSES).context("bundled mock responses are invalid")?;
        let responses = all.get(biller.as_str()).cloned().unwrap_or_default();
        Ok(Self {
            biller,
            behavior,
            responses,
            calls: AtomicUsize::new(0),
        })
    }

    /// Number of times the wire was actually reached.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn approval(&self, operation: OperationType) -> String {
        self.responses
            .get(operation.as_str())
            .or_else(|| self.responses.get("default"))
            .map(|v| v.to_string())
            .unwrap_or_else(|| "{}".to_string())
    }
}

#[async_trait::async_trait]
impl BillerClient for MockBillerClient {
    fn biller(&self) -> BillerName {
        self.biller
    }

    async fn send(&self, command: &BillerCommand) -> Result<RawExchange, BillerCallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let request = command.to_payload()?;

        let response = match (&self.behavior, command) {
            (MockBehavior::AlwaysFailure, _) => {
                return Err(BillerCallError::Transport("mock connection refused".to_string()))
            }
            (MockBehavior::AlwaysTimeout, _) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                return Err(BillerCallError::Transport("mock call never answered".to_string()));
            }
            (MockBehavior::Respond(body), _) => body.clone(),
            (MockBehavior::Approve, BillerCommand::PostbackTranslate(postback)) => postback.payload.to_string(),
            (MockBehavior::Approve, _) => self.approval(command.operation()),
        };

        Ok(RawExchange { request, response })
    }
}
