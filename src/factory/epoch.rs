use crate::domain::biller_settings::{BillerName, BillerSettings, EpochSettings};
use crate::domain::error::{DomainError, ValidationError};
use crate::domain::payment_information::PaymentType;
use crate::domain::transaction::{ThreeDsState, Transaction, TransactionDraft, TransactionKind};
use crate::factory::NewSaleRequest;
use crate::identity;

/// Hosted-page sale. Card data never touches us, so there is no payment
/// information; the outcome arrives later through a postback.
pub fn create_new_sale(mut settings: EpochSettings, request: NewSaleRequest) -> Result<Transaction, DomainError> {
    BillerSettings::Epoch(settings.clone()).validate()?;
    if request.payment_type == PaymentType::Cryptocurrency {
        return Err(ValidationError::UnsupportedPaymentMethod {
            biller: BillerName::Epoch,
            payment: request.payment_type.as_str(),
        }
        .into());
    }

    if settings.invoice_id.as_deref().map_or(true, |v| v.trim().is_empty()) {
        settings.invoice_id = Some(identity::generate_merchant_invoice_id());
    }

    let biller_settings = BillerSettings::Epoch(settings);
    let snapshot = biller_settings.subsequent_operation_fields();

    Transaction::create(TransactionDraft {
        kind: TransactionKind::Charge,
        biller_settings,
        charge_information: Some(request.charge_information),
        payment_information: None,
        payment_type: request.payment_type,
        payment_method: request.payment_method,
        previous_transaction_id: request.previous_transaction_id,
        three_ds: ThreeDsState::default(),
        subsequent_operation_fields: Some(snapshot),
    })
}
