use crate::domain::biller_settings::BillerName;
use crate::domain::status::{Operation, Status};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("unknown currency code '{0}'")]
    UnknownCurrency(String),

    #[error("rebill {field} must be greater than zero")]
    InvalidRebill { field: &'static str },

    #[error("tax breakdown does not reconcile: {0}")]
    TaxMismatch(String),

    #[error("missing merchant information for {biller}: {field}")]
    MissingMerchantInformation {
        biller: BillerName,
        field: &'static str,
    },

    #[error("invalid payment information: {0}")]
    InvalidPaymentInformation(String),

    #[error("{biller} cannot process {payment} payments")]
    UnsupportedPaymentMethod {
        biller: BillerName,
        payment: &'static str,
    },

    #[error("charge information is required for {0}")]
    MissingChargeInformation(&'static str),

    #[error("a charge batch may contain at most one main purchase, found {0}")]
    MultipleMainPurchases(usize),

    #[error("transaction is not a free sale")]
    NotFreeSale,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal state transition: cannot {operation} a {from} transaction")]
pub struct IllegalStateTransition {
    pub from: Status,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    IllegalStateTransition(#[from] IllegalStateTransition),

    #[error("invalid 3DS version: transaction is at version {current}, response reported {reported}")]
    InvalidThreedsVersion { current: u8, reported: u8 },

    #[error("biller interaction payload is not valid JSON: {0}")]
    PayloadIntegrity(String),

    #[error("no {field} available for a subsequent operation on {biller}")]
    MissingSubsequentOperationField {
        biller: BillerName,
        field: &'static str,
    },

    #[error("operation needs a {expected} transaction")]
    WrongTransactionKind { expected: &'static str },

    #[error("malformed transaction document: {0}")]
    MalformedDocument(String),
}
