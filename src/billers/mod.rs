use crate::domain::biller_response::{BillerResponse, ResponseResult};
use crate::domain::biller_settings::BillerName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod command;
pub mod epoch;
pub mod legacy;
pub mod mock;
pub mod netbilling;
pub mod pumapay;
pub mod qysso;
pub mod rocketgate;

pub use command::{
    BillerCommand, CardUploadCommand, ChargeCommand, LookupThreeDsTwoCommand, NewSaleCommand, PostbackCommand,
    RebillUpdateCommand, ThreeDCompletionCommand, ThreeDRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    ChargeNewCard,
    ChargeExistingCard,
    CompleteThreeD,
    SimplifiedCompleteThreeD,
    LookupThreeDsTwo,
    SuspendRebill,
    UpdateRebill,
    StartRebill,
    StopRebill,
    CardUpload,
    NewSale,
    PostbackTranslate,
}

impl OperationType {
    pub const ALL: [OperationType; 12] = [
        OperationType::ChargeNewCard,
        OperationType::ChargeExistingCard,
        OperationType::CompleteThreeD,
        OperationType::SimplifiedCompleteThreeD,
        OperationType::LookupThreeDsTwo,
        OperationType::SuspendRebill,
        OperationType::UpdateRebill,
        OperationType::StartRebill,
        OperationType::StopRebill,
        OperationType::CardUpload,
        OperationType::NewSale,
        OperationType::PostbackTranslate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::ChargeNewCard => "charge_new_card",
            OperationType::ChargeExistingCard => "charge_existing_card",
            OperationType::CompleteThreeD => "complete_three_d",
            OperationType::SimplifiedCompleteThreeD => "simplified_complete_three_d",
            OperationType::LookupThreeDsTwo => "lookup_three_ds_two",
            OperationType::SuspendRebill => "suspend_rebill",
            OperationType::UpdateRebill => "update_rebill",
            OperationType::StartRebill => "start_rebill",
            OperationType::StopRebill => "stop_rebill",
            OperationType::CardUpload => "card_upload",
            OperationType::NewSale => "new_sale",
            OperationType::PostbackTranslate => "postback_translate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        OperationType::ALL.into_iter().find(|op| op.as_str() == value)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations each biller actually offers. Anything else is answered with an
/// aborted response without reaching the wire.
pub fn supported_operations(biller: BillerName) -> &'static [OperationType] {
    use OperationType::*;
    match biller {
        BillerName::Rocketgate => &[
            ChargeNewCard,
            ChargeExistingCard,
            CompleteThreeD,
            SimplifiedCompleteThreeD,
            LookupThreeDsTwo,
            SuspendRebill,
            UpdateRebill,
            StartRebill,
            StopRebill,
            CardUpload,
        ],
        BillerName::Netbilling => &[
            ChargeNewCard,
            ChargeExistingCard,
            SuspendRebill,
            UpdateRebill,
            StopRebill,
            CardUpload,
        ],
        BillerName::Epoch => &[NewSale, PostbackTranslate],
        BillerName::Pumapay => &[NewSale, PostbackTranslate],
        BillerName::Qysso => &[NewSale, PostbackTranslate, StopRebill],
        BillerName::Legacy => &[NewSale, PostbackTranslate],
    }
}

/// What went over the wire, as text, in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExchange {
    pub request: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillerCallError {
    #[error("biller call timed out after {millis}ms")]
    Timeout { millis: u64 },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("circuit open for {0}")]
    CircuitOpen(String),
    #[error("{biller} does not support {operation}")]
    Unsupported {
        biller: BillerName,
        operation: OperationType,
    },
    #[error("request could not be encoded: {0}")]
    Encoding(String),
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

impl BillerCallError {
    /// Whether this error is held against the biller in breaker accounting.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(
            self,
            BillerCallError::Unsupported { .. } | BillerCallError::CircuitOpen(_) | BillerCallError::Encoding(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BillerCallError::Timeout { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    #[error("{biller} response is not a JSON object: {detail}")]
    NotJson { biller: BillerName, detail: String },
    #[error("{biller} response is missing '{field}'")]
    MissingField { biller: BillerName, field: &'static str },
    #[error("{biller} response has unexpected {field} '{value}'")]
    UnexpectedValue {
        biller: BillerName,
        field: &'static str,
        value: String,
    },
}

/// Wire transport for one biller. Implementations only move bytes; all
/// interpretation of the answer lives in the matching translator.
#[async_trait::async_trait]
pub trait BillerClient: Send + Sync {
    fn biller(&self) -> BillerName;

    async fn send(&self, command: &BillerCommand) -> Result<RawExchange, BillerCallError>;
}

pub trait ResponseTranslator: Send + Sync {
    fn biller(&self) -> BillerName;

    fn translate(
        &self,
        operation: OperationType,
        exchange: &RawExchange,
        request_date: DateTime<Utc>,
        response_date: DateTime<Utc>,
    ) -> Result<BillerResponse, TranslationError>;
}

pub fn translator_for(biller: BillerName) -> Box<dyn ResponseTranslator> {
    match biller {
        BillerName::Rocketgate => Box::new(rocketgate::RocketgateTranslator),
        BillerName::Netbilling => Box::new(netbilling::NetbillingTranslator),
        BillerName::Epoch => Box::new(epoch::EpochTranslator),
        BillerName::Pumapay => Box::new(pumapay::PumapayTranslator),
        BillerName::Qysso => Box::new(qysso::QyssoTranslator),
        BillerName::Legacy => Box::new(legacy::LegacyTranslator),
    }
}

pub(crate) fn parse_object(
    biller: BillerName,
    raw: &str,
) -> Result<serde_json::Map<String, Value>, TranslationError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TranslationError::NotJson {
            biller,
            detail: format!("expected object, got {}", type_name(&other)),
        }),
        Err(e) => Err(TranslationError::NotJson {
            biller,
            detail: e.to_string(),
        }),
    }
}

/// Billers are loose about JSON types; numbers and strings are both accepted.
pub(crate) fn field_str(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn base_response(
    result: ResponseResult,
    exchange: &RawExchange,
    request_date: DateTime<Utc>,
    response_date: DateTime<Utc>,
) -> BillerResponse {
    let mut response = BillerResponse::new(result, request_date, response_date);
    response.request_payload = Some(exchange.request.clone());
    response.response_payload = Some(exchange.response.clone());
    response
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
