use crate::domain::biller_settings::{BillerName, BillerSettings, NetbillingSettings};
use crate::domain::error::{DomainError, ValidationError};
use crate::domain::payment_information::PaymentInformation;
use crate::domain::transaction::{ThreeDsState, Transaction, TransactionDraft, TransactionKind};
use crate::factory::{ChargeRequest, RebillUpdateRequest};
use crate::identity;

/// Netbilling bills new cards, or a stored card addressed by member id.
pub fn create_charge(settings: NetbillingSettings, request: ChargeRequest) -> Result<Transaction, DomainError> {
    BillerSettings::Netbilling(settings.clone()).validate()?;
    let charge_information = request
        .charge_information
        .ok_or(ValidationError::MissingChargeInformation("a netbilling charge"))?;

    let payment = request.payment.into_payment_information(settings.member_id.as_deref())?;
    if let PaymentInformation::BankCheck(_) = payment {
        return Err(ValidationError::UnsupportedPaymentMethod {
            biller: BillerName::Netbilling,
            payment: payment.kind(),
        }
        .into());
    }

    let biller_settings = BillerSettings::Netbilling(settings);
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

pub fn create_rebill_update(
    mut settings: NetbillingSettings,
    request: RebillUpdateRequest,
) -> Result<Transaction, DomainError> {
    BillerSettings::Netbilling(settings.clone()).validate()?;
    request.check_shape()?;
    if request.payment.is_some() {
        return Err(ValidationError::InvalidPaymentInformation(
            "netbilling rebill updates keep the card on file".to_string(),
        )
        .into());
    }

    let member_id =
        identity::resolve_member_id(&BillerSettings::Netbilling(settings.clone()), request.original.as_ref())?;
    settings.member_id = Some(member_id);

    let biller_settings = BillerSettings::Netbilling(settings);
    let snapshot = biller_settings.subsequent_operation_fields();

    Transaction::create(TransactionDraft {
        kind: TransactionKind::RebillUpdate {
            operation: request.operation,
        },
        biller_settings,
        charge_information: request.charge_information,
        payment_information: None,
        payment_type: request.payment_type,
        payment_method: None,
        previous_transaction_id: request.previous_transaction_id,
        three_ds: ThreeDsState::default(),
        subsequent_operation_fields: Some(snapshot),
    })
}
