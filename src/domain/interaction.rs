use crate::domain::biller_settings::BillerName;
use crate::domain::error::DomainError;
use crate::obfuscation::Obfuscator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    Request,
    Response,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillerInteraction {
    #[serde(rename = "type")]
    interaction_type: InteractionType,
    payload: Value,
    created_at: DateTime<Utc>,
}

impl BillerInteraction {
    /// Parses a raw wire payload and masks it before it is kept. A payload
    /// that is not JSON is refused: the audit trail never stores partial data.
    pub fn record(
        interaction_type: InteractionType,
        raw_payload: &str,
        created_at: DateTime<Utc>,
        biller: BillerName,
        obfuscator: &Obfuscator,
    ) -> Result<Self, DomainError> {
        let parsed: Value = serde_json::from_str(raw_payload).map_err(|e| {
            DomainError::PayloadIntegrity(format!("{} payload from {}: {}", kind(interaction_type), biller, e))
        })?;

        Ok(Self {
            interaction_type,
            payload: obfuscator.obfuscate(biller, &parsed),
            created_at,
        })
    }

    pub fn interaction_type(&self) -> InteractionType {
        self.interaction_type
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_response(&self) -> bool {
        self.interaction_type == InteractionType::Response
    }
}

fn kind(t: InteractionType) -> &'static str {
    match t {
        InteractionType::Request => "request",
        InteractionType::Response => "response",
    }
}

/// Append-only audit log; entries are never exposed mutably.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionLog(Vec<BillerInteraction>);

impl InteractionLog {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn append(&mut self, interaction: BillerInteraction) {
        self.0.push(interaction);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BillerInteraction> {
        self.0.iter()
    }

    /// Entries may be appended out of wall-clock order by concurrent
    /// sub-flows, so the latest is chosen by timestamp, not position.
    pub fn most_recent_response(&self) -> Option<&BillerInteraction> {
        self.most_recent(InteractionType::Response)
    }

    pub fn most_recent_request(&self) -> Option<&BillerInteraction> {
        self.most_recent(InteractionType::Request)
    }

    pub fn most_recent_response_payload(&self) -> Option<&Value> {
        self.most_recent_response().map(|i| &i.payload)
    }

    fn most_recent(&self, t: InteractionType) -> Option<&BillerInteraction> {
        self.0
            .iter()
            .filter(|i| i.interaction_type == t)
            .max_by_key(|i| i.created_at)
    }

    pub fn sorted_by_created_at(&self) -> Vec<&BillerInteraction> {
        let mut out: Vec<&BillerInteraction> = self.0.iter().collect();
        out.sort_by_key(|i| i.created_at);
        out
    }
}
