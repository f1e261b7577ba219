use crate::domain::biller_settings::{BillerSettings, RocketgateSettings};
use crate::domain::error::{DomainError, ValidationError};
use crate::domain::transaction::{ThreeDsState, Transaction, TransactionDraft, TransactionKind};
use crate::factory::{ChargeRequest, RebillUpdateRequest};
use crate::identity;

/// New-card, card-hash and check charges. Missing customer and invoice ids
/// are generated here and snapshotted so later rebill calls can reuse them.
pub fn create_charge(mut settings: RocketgateSettings, request: ChargeRequest) -> Result<Transaction, DomainError> {
    BillerSettings::Rocketgate(settings.clone()).validate()?;
    let charge_information = request
        .charge_information
        .ok_or(ValidationError::MissingChargeInformation("a rocketgate charge"))?;

    if blank(&settings.merchant_customer_id) {
        settings.merchant_customer_id = Some(identity::generate_merchant_customer_id());
    }
    if blank(&settings.merchant_invoice_id) {
        settings.merchant_invoice_id = Some(identity::generate_merchant_invoice_id());
    }

    let payment = request
        .payment
        .into_payment_information(settings.merchant_customer_id.as_deref())?;

    let biller_settings = BillerSettings::Rocketgate(settings);
    let snapshot = biller_settings.subsequent_operation_fields();

    Transaction::create(TransactionDraft {
        kind: TransactionKind::Charge,
        payment_type: payment.payment_type(),
        payment_method: None,
        biller_settings,
        charge_information: Some(charge_information),
        payment_information: Some(payment),
        previous_transaction_id: request.previous_transaction_id,
        three_ds: request.three_d.into_state(),
        subsequent_operation_fields: Some(snapshot),
    })
}

/// Rebill start/stop/update/suspend against the subscription the original
/// charge created. Ids are never generated here.
pub fn create_rebill_update(
    mut settings: RocketgateSettings,
    request: RebillUpdateRequest,
) -> Result<Transaction, DomainError> {
    BillerSettings::Rocketgate(settings.clone()).validate()?;
    request.check_shape()?;

    let current = BillerSettings::Rocketgate(settings.clone());
    let original = request.original.as_ref();
    let customer_id = identity::resolve_merchant_customer_id(&current, original)?;
    let invoice_id = identity::resolve_merchant_invoice_id(&current, original)?;
    settings.merchant_customer_id = Some(customer_id.clone());
    settings.merchant_invoice_id = Some(invoice_id);
    if settings.merchant_account.is_none() {
        settings.merchant_account = original.and_then(|o| o.merchant_account.clone());
    }

    let payment = match request.payment {
        Some(details) => Some(details.into_payment_information(Some(&customer_id))?),
        None => None,
    };
    let payment_type = payment.as_ref().map_or(request.payment_type, |p| p.payment_type());

    let biller_settings = BillerSettings::Rocketgate(settings);
    let snapshot = biller_settings.subsequent_operation_fields();

    Transaction::create(TransactionDraft {
        kind: TransactionKind::RebillUpdate {
            operation: request.operation,
        },
        biller_settings,
        charge_information: request.charge_information,
        payment_information: payment,
        payment_type,
        payment_method: None,
        previous_transaction_id: request.previous_transaction_id,
        three_ds: ThreeDsState::default(),
        subsequent_operation_fields: Some(snapshot),
    })
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
