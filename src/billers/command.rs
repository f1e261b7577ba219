use crate::billers::{BillerCallError, OperationType};
use crate::domain::biller_settings::{BillerSettings, SubsequentOperationFields};
use crate::domain::error::{DomainError, ValidationError};
use crate::domain::money::ChargeInformation;
use crate::domain::payment_information::{PaymentInformation, PaymentType};
use crate::domain::transaction::{RebillUpdateOperation, Transaction, TransactionId, TransactionKind};
use crate::identity;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreeDRequest {
    pub use_three_d: bool,
    pub version: Option<u8>,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeCommand {
    pub transaction_id: TransactionId,
    pub settings: BillerSettings,
    pub charge_information: ChargeInformation,
    pub payment_information: PaymentInformation,
    pub three_d: ThreeDRequest,
}

impl ChargeCommand {
    pub fn from_transaction(tx: &Transaction) -> Result<Self, DomainError> {
        if tx.kind() != TransactionKind::Charge {
            return Err(DomainError::WrongTransactionKind { expected: "charge" });
        }
        Ok(Self {
            transaction_id: tx.id(),
            settings: tx.biller_settings().clone(),
            charge_information: required_charge(tx)?,
            payment_information: required_payment(tx)?,
            three_d: ThreeDRequest {
                use_three_d: tx.three_ds().with_3d,
                version: tx.three_ds().version,
                return_url: tx.three_ds().return_url.clone(),
            },
        })
    }

    pub fn operation(&self) -> OperationType {
        match self.payment_information {
            PaymentInformation::TokenizedCreditCard(_) => OperationType::ChargeExistingCard,
            _ => OperationType::ChargeNewCard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreeDCompletionCommand {
    pub transaction_id: TransactionId,
    pub settings: BillerSettings,
    pub biller_transaction_id: Option<String>,
    pub pares: Option<String>,
    pub md: Option<String>,
}

impl ThreeDCompletionCommand {
    pub fn from_transaction(tx: &Transaction, pares: Option<String>, md: Option<String>) -> Result<Self, DomainError> {
        Ok(Self {
            transaction_id: tx.id(),
            settings: followup_settings(tx)?,
            biller_transaction_id: tx.biller_transaction_id().map(str::to_string),
            pares,
            md,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupThreeDsTwoCommand {
    pub transaction_id: TransactionId,
    pub settings: BillerSettings,
    pub charge_information: ChargeInformation,
    pub payment_information: PaymentInformation,
    pub device_fingerprint_id: Option<String>,
    pub return_url: Option<String>,
}

impl LookupThreeDsTwoCommand {
    pub fn from_transaction(tx: &Transaction, device_fingerprint_id: Option<String>) -> Result<Self, DomainError> {
        Ok(Self {
            transaction_id: tx.id(),
            settings: followup_settings(tx)?,
            charge_information: required_charge(tx)?,
            payment_information: required_payment(tx)?,
            device_fingerprint_id,
            return_url: tx.three_ds().return_url.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebillUpdateCommand {
    pub transaction_id: TransactionId,
    pub operation: RebillUpdateOperation,
    pub settings: BillerSettings,
    pub charge_information: Option<ChargeInformation>,
    pub payment_information: Option<PaymentInformation>,
}

impl RebillUpdateCommand {
    pub fn from_transaction(tx: &Transaction) -> Result<Self, DomainError> {
        let operation = tx.rebill_operation().ok_or(DomainError::WrongTransactionKind {
            expected: "rebill update",
        })?;
        Ok(Self {
            transaction_id: tx.id(),
            operation,
            settings: followup_settings(tx)?,
            charge_information: tx.charge_information().cloned(),
            payment_information: tx.payment_information().cloned(),
        })
    }

    pub fn operation_type(&self) -> OperationType {
        match self.operation {
            RebillUpdateOperation::Start => OperationType::StartRebill,
            RebillUpdateOperation::Stop => OperationType::StopRebill,
            RebillUpdateOperation::Update => OperationType::UpdateRebill,
            RebillUpdateOperation::Suspend => OperationType::SuspendRebill,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardUploadCommand {
    pub transaction_id: TransactionId,
    pub settings: BillerSettings,
    pub payment_information: PaymentInformation,
}

impl CardUploadCommand {
    pub fn from_transaction(tx: &Transaction) -> Result<Self, DomainError> {
        Ok(Self {
            transaction_id: tx.id(),
            settings: tx.biller_settings().clone(),
            payment_information: required_payment(tx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSaleCommand {
    pub transaction_id: TransactionId,
    pub settings: BillerSettings,
    pub charge_information: ChargeInformation,
    pub payment_type: PaymentType,
    pub payment_method: Option<String>,
}

impl NewSaleCommand {
    pub fn from_transaction(tx: &Transaction) -> Result<Self, DomainError> {
        Ok(Self {
            transaction_id: tx.id(),
            settings: tx.biller_settings().clone(),
            charge_information: required_charge(tx)?,
            payment_type: tx.payment_type(),
            payment_method: tx.payment_method().map(str::to_string),
        })
    }
}

/// An asynchronous notification the biller sent us about a hosted sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostbackCommand {
    pub transaction_id: TransactionId,
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BillerCommand {
    Charge(ChargeCommand),
    CompleteThreeD(ThreeDCompletionCommand),
    SimplifiedCompleteThreeD(ThreeDCompletionCommand),
    LookupThreeDsTwo(LookupThreeDsTwoCommand),
    RebillUpdate(RebillUpdateCommand),
    CardUpload(CardUploadCommand),
    NewSale(NewSaleCommand),
    PostbackTranslate(PostbackCommand),
}

impl BillerCommand {
    pub fn operation(&self) -> OperationType {
        match self {
            BillerCommand::Charge(c) => c.operation(),
            BillerCommand::CompleteThreeD(_) => OperationType::CompleteThreeD,
            BillerCommand::SimplifiedCompleteThreeD(_) => OperationType::SimplifiedCompleteThreeD,
            BillerCommand::LookupThreeDsTwo(_) => OperationType::LookupThreeDsTwo,
            BillerCommand::RebillUpdate(c) => c.operation_type(),
            BillerCommand::CardUpload(_) => OperationType::CardUpload,
            BillerCommand::NewSale(_) => OperationType::NewSale,
            BillerCommand::PostbackTranslate(_) => OperationType::PostbackTranslate,
        }
    }

    pub fn transaction_id(&self) -> TransactionId {
        match self {
            BillerCommand::Charge(c) => c.transaction_id,
            BillerCommand::CompleteThreeD(c) | BillerCommand::SimplifiedCompleteThreeD(c) => c.transaction_id,
            BillerCommand::LookupThreeDsTwo(c) => c.transaction_id,
            BillerCommand::RebillUpdate(c) => c.transaction_id,
            BillerCommand::CardUpload(c) => c.transaction_id,
            BillerCommand::NewSale(c) => c.transaction_id,
            BillerCommand::PostbackTranslate(c) => c.transaction_id,
        }
    }

    pub fn to_payload(&self) -> Result<String, BillerCallError> {
        serde_json::to_string(self).map_err(|e| BillerCallError::Encoding(e.to_string()))
    }
}

/// Settings for an operation that addresses an existing upstream record.
/// Identifiers come from the current settings or from the snapshot taken at
/// the original charge.
fn followup_settings(tx: &Transaction) -> Result<BillerSettings, DomainError> {
    let current = tx.biller_settings();
    let snapshot: Option<&SubsequentOperationFields> = tx.subsequent_operation_fields();

    match current {
        BillerSettings::Rocketgate(s) => {
            let mut s = s.clone();
            s.merchant_customer_id = Some(identity::resolve_merchant_customer_id(current, snapshot)?);
            s.merchant_invoice_id = Some(identity::resolve_merchant_invoice_id(current, snapshot)?);
            Ok(BillerSettings::Rocketgate(s))
        }
        BillerSettings::Netbilling(s) => {
            let mut s = s.clone();
            s.member_id = Some(identity::resolve_member_id(current, snapshot)?);
            Ok(BillerSettings::Netbilling(s))
        }
        BillerSettings::Qysso(s) => {
            let mut s = s.clone();
            s.member_id = Some(identity::resolve_member_id(current, snapshot)?);
            Ok(BillerSettings::Qysso(s))
        }
        other => Ok(other.clone()),
    }
}

fn required_charge(tx: &Transaction) -> Result<ChargeInformation, DomainError> {
    tx.charge_information()
        .cloned()
        .ok_or_else(|| ValidationError::MissingChargeInformation("this biller operation").into())
}

fn required_payment(tx: &Transaction) -> Result<PaymentInformation, DomainError> {
    tx.payment_information().cloned().ok_or_else(|| {
        ValidationError::InvalidPaymentInformation("payment information is required for this operation".to_string())
            .into()
    })
}
