use crate::domain::biller_response::{reconcile_three_ds_version, BillerResponse};
use crate::domain::biller_settings::{BillerName, BillerSettings, SubsequentOperationFields};
use crate::domain::error::{DomainError, IllegalStateTransition, ValidationError};
use crate::domain::error_classification::ErrorClassification;
use crate::domain::interaction::{BillerInteraction, InteractionLog, InteractionType};
use crate::domain::money::ChargeInformation;
use crate::domain::payment_information::{PaymentInformation, PaymentType};
use crate::domain::status::{transition, Operation, Status};
use crate::obfuscation::Obfuscator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebillUpdateOperation {
    Start,
    Stop,
    Update,
    Suspend,
}

impl RebillUpdateOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RebillUpdateOperation::Start => "start",
            RebillUpdateOperation::Stop => "stop",
            RebillUpdateOperation::Update => "update",
            RebillUpdateOperation::Suspend => "suspend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    Charge,
    RebillUpdate { operation: RebillUpdateOperation },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreeDsState {
    pub version: Option<u8>,
    pub required_to_use_3d: bool,
    pub with_3d: bool,
    pub auth_required: bool,
    pub init_required: bool,
    pub sca_required: bool,
    pub return_url: Option<String>,
}

/// Everything a factory decides before the aggregate exists.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub biller_settings: BillerSettings,
    pub charge_information: Option<ChargeInformation>,
    pub payment_information: Option<PaymentInformation>,
    pub payment_type: PaymentType,
    pub payment_method: Option<String>,
    pub previous_transaction_id: Option<TransactionId>,
    pub three_ds: ThreeDsState,
    pub subsequent_operation_fields: Option<SubsequentOperationFields>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    kind: TransactionKind,
    biller_name: BillerName,
    biller_settings: BillerSettings,
    charge_information: Option<ChargeInformation>,
    payment_information: Option<PaymentInformation>,
    payment_type: PaymentType,
    payment_method: Option<String>,
    status: Status,
    previous_transaction_id: Option<TransactionId>,
    #[serde(default)]
    biller_interactions: InteractionLog,
    #[serde(default)]
    three_ds: ThreeDsState,
    #[serde(default)]
    is_nsf: bool,
    error_classification: Option<ErrorClassification>,
    response_code: Option<String>,
    response_reason: Option<String>,
    biller_transaction_id: Option<String>,
    subsequent_operation_fields: Option<SubsequentOperationFields>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn create(draft: TransactionDraft) -> Result<Self, DomainError> {
        draft.biller_settings.validate()?;

        if let Some(payment) = &draft.payment_information {
            if payment.payment_type() != draft.payment_type {
                return Err(ValidationError::InvalidPaymentInformation(format!(
                    "{} payment information cannot back a {} payment",
                    payment.kind(),
                    draft.payment_type.as_str()
                ))
                .into());
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: TransactionId::new(),
            kind: draft.kind,
            biller_name: draft.biller_settings.biller_name(),
            biller_settings: draft.biller_settings,
            charge_information: draft.charge_information,
            payment_information: draft.payment_information,
            payment_type: draft.payment_type,
            payment_method: draft.payment_method,
            status: Status::Pending,
            previous_transaction_id: draft.previous_transaction_id,
            biller_interactions: InteractionLog::new(),
            three_ds: draft.three_ds,
            is_nsf: false,
            error_classification: None,
            response_code: None,
            response_reason: None,
            biller_transaction_id: None,
            subsequent_operation_fields: draft.subsequent_operation_fields,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn rebill_operation(&self) -> Option<RebillUpdateOperation> {
        match self.kind {
            TransactionKind::RebillUpdate { operation } => Some(operation),
            TransactionKind::Charge => None,
        }
    }

    pub fn biller_name(&self) -> BillerName {
        self.biller_name
    }

    pub fn biller_settings(&self) -> &BillerSettings {
        &self.biller_settings
    }

    pub fn charge_information(&self) -> Option<&ChargeInformation> {
        self.charge_information.as_ref()
    }

    pub fn payment_information(&self) -> Option<&PaymentInformation> {
        self.payment_information.as_ref()
    }

    pub fn payment_type(&self) -> PaymentType {
        self.payment_type
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn previous_transaction_id(&self) -> Option<TransactionId> {
        self.previous_transaction_id
    }

    pub fn biller_interactions(&self) -> &InteractionLog {
        &self.biller_interactions
    }

    pub fn three_ds(&self) -> &ThreeDsState {
        &self.three_ds
    }

    pub fn is_nsf(&self) -> bool {
        self.is_nsf
    }

    pub fn error_classification(&self) -> Option<&ErrorClassification> {
        self.error_classification.as_ref()
    }

    pub fn response_code(&self) -> Option<&str> {
        self.response_code.as_deref()
    }

    pub fn response_reason(&self) -> Option<&str> {
        self.response_reason.as_deref()
    }

    pub fn biller_transaction_id(&self) -> Option<&str> {
        self.biller_transaction_id.as_deref()
    }

    pub fn subsequent_operation_fields(&self) -> Option<&SubsequentOperationFields> {
        self.subsequent_operation_fields.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_free_sale(&self) -> bool {
        self.charge_information
            .as_ref()
            .map_or(true, |c| c.amount().is_zero())
    }

    pub fn is_awaiting_three_d(&self) -> bool {
        self.status.is_pending() && (self.three_ds.auth_required || self.three_ds.init_required || self.three_ds.sca_required)
    }

    /// Folds one biller attempt into the aggregate. Everything that can fail
    /// is computed first, so an error leaves the transaction untouched.
    pub fn apply_response(&mut self, response: &BillerResponse, obfuscator: &Obfuscator) -> Result<Status, DomainError> {
        let mut entries = Vec::with_capacity(2);
        if let Some(raw) = &response.request_payload {
            entries.push(BillerInteraction::record(
                InteractionType::Request,
                raw,
                response.request_date,
                self.biller_name,
                obfuscator,
            )?);
        }
        if let Some(raw) = &response.response_payload {
            entries.push(BillerInteraction::record(
                InteractionType::Response,
                raw,
                response.response_date,
                self.biller_name,
                obfuscator,
            )?);
        }

        let next_status = match response.result.operation() {
            Some(operation) => transition(self.status, operation)?,
            None => self.status,
        };

        let mut three_ds = self.three_ds.clone();
        if response.requires_three_d() && !three_ds.with_3d {
            tracing::warn!(
                transaction_id = %self.id,
                biller = %self.biller_name,
                "biller requested 3DS for a transaction not flagged with 3DS, skipping"
            );
        } else {
            three_ds.version = reconcile_three_ds_version(three_ds.version, response.three_ds_version)?;
            three_ds.auth_required |= response.three_ds_auth_required;
            three_ds.init_required |= response.three_ds_init_required;
            three_ds.sca_required |= response.three_ds_sca_required;
        }

        let refined_charge = match (&response.charge_refinement, &self.charge_information) {
            (Some(refinement), Some(current)) if self.biller_name == BillerName::Legacy => {
                Some(current.refined(refinement.amount, refinement.rebill.clone())?)
            }
            _ => None,
        };

        for entry in entries {
            self.biller_interactions.append(entry);
        }
        if let Some(code) = &response.code {
            self.response_code = Some(code.clone());
        }
        if let Some(reason) = &response.reason {
            self.response_reason = Some(reason.clone());
        }
        if let Some(id) = &response.biller_transaction_id {
            self.biller_transaction_id = Some(id.clone());
        }
        if let Some(charge) = refined_charge {
            self.charge_information = Some(charge);
        }
        self.is_nsf |= response.is_nsf_transaction;
        self.three_ds = three_ds;

        if next_status != self.status {
            tracing::info!(
                transaction_id = %self.id,
                biller = %self.biller_name,
                from = %self.status,
                to = %next_status,
                "transaction status changed"
            );
        }
        self.status = next_status;
        self.updated_at = Utc::now();
        Ok(self.status)
    }

    pub fn refund(&mut self) -> Result<Status, IllegalStateTransition> {
        self.apply_operation(Operation::Refund)
    }

    pub fn chargeback(&mut self) -> Result<Status, IllegalStateTransition> {
        self.apply_operation(Operation::Chargeback)
    }

    /// Free sales never reach a biller; they are approved on the spot.
    pub fn approve_free_sale(&mut self) -> Result<Status, DomainError> {
        if !self.is_free_sale() {
            return Err(ValidationError::NotFreeSale.into());
        }
        Ok(self.apply_operation(Operation::Approve)?)
    }

    pub fn record_error_classification(&mut self, classification: ErrorClassification) {
        self.error_classification = Some(classification);
        self.updated_at = Utc::now();
    }

    fn apply_operation(&mut self, operation: Operation) -> Result<Status, IllegalStateTransition> {
        let next = transition(self.status, operation)?;
        if next != self.status {
            self.status = next;
            self.updated_at = Utc::now();
        }
        Ok(next)
    }

    pub fn to_document(&self) -> Result<Value, DomainError> {
        serde_json::to_value(self).map_err(|e| DomainError::MalformedDocument(e.to_string()))
    }

    pub fn from_document(document: Value) -> Result<Self, DomainError> {
        let tx: Transaction =
            serde_json::from_value(document).map_err(|e| DomainError::MalformedDocument(e.to_string()))?;
        if tx.biller_name != tx.biller_settings.biller_name() {
            return Err(DomainError::MalformedDocument(format!(
                "biller_name {} does not match {} settings",
                tx.biller_name,
                tx.biller_settings.biller_name()
            )));
        }
        Ok(tx)
    }
}
