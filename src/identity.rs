use crate::domain::biller_settings::{BillerName, BillerSettings, SubsequentOperationFields};
use crate::domain::error::DomainError;
use uuid::Uuid;

pub fn generate_merchant_customer_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn generate_merchant_invoice_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Lookup order: what the caller sent now, then what was captured at the
/// original charge. Neither present is an error; a fresh id would point at
/// a different upstream subscription.
pub fn resolve_merchant_customer_id(
    settings: &BillerSettings,
    snapshot: Option<&SubsequentOperationFields>,
) -> Result<String, DomainError> {
    resolve(
        settings.biller_name(),
        "merchant_customer_id",
        settings.merchant_customer_id(),
        snapshot.and_then(|s| s.merchant_customer_id.as_deref()),
    )
}

pub fn resolve_merchant_invoice_id(
    settings: &BillerSettings,
    snapshot: Option<&SubsequentOperationFields>,
) -> Result<String, DomainError> {
    resolve(
        settings.biller_name(),
        "merchant_invoice_id",
        settings.merchant_invoice_id(),
        snapshot.and_then(|s| s.merchant_invoice_id.as_deref()),
    )
}

pub fn resolve_member_id(
    settings: &BillerSettings,
    snapshot: Option<&SubsequentOperationFields>,
) -> Result<String, DomainError> {
    resolve(
        settings.biller_name(),
        "member_id",
        settings.member_id(),
        snapshot.and_then(|s| s.member_id.as_deref()),
    )
}

fn resolve(
    biller: BillerName,
    field: &'static str,
    current: Option<&str>,
    captured: Option<&str>,
) -> Result<String, DomainError> {
    current
        .or(captured.filter(|v| !v.trim().is_empty()))
        .map(str::to_string)
        .ok_or(DomainError::MissingSubsequentOperationField { biller, field })
}
