use crate::domain::biller_settings::{BillerName, BillerSettings, QyssoSettings, SubsequentOperationFields};
use crate::domain::error::{DomainError, ValidationError};
use crate::domain::payment_information::PaymentType;
use crate::domain::transaction::{
    RebillUpdateOperation, ThreeDsState, Transaction, TransactionDraft, TransactionId, TransactionKind,
};
use crate::factory::NewSaleRequest;
use crate::identity;

pub fn create_new_sale(settings: QyssoSettings, request: NewSaleRequest) -> Result<Transaction, DomainError> {
    BillerSettings::Qysso(settings.clone()).validate()?;
    if request.payment_type == PaymentType::Cryptocurrency {
        return Err(ValidationError::UnsupportedPaymentMethod {
            biller: BillerName::Qysso,
            payment: request.payment_type.as_str(),
        }
        .into());
    }

    let biller_settings = BillerSettings::Qysso(settings);
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

/// Qysso only supports cancelling a rebill; the member id must come from
/// the caller or from the original sale.
pub fn create_rebill_cancel(
    mut settings: QyssoSettings,
    original: Option<&SubsequentOperationFields>,
    payment_type: PaymentType,
    previous_transaction_id: Option<TransactionId>,
) -> Result<Transaction, DomainError> {
    let member_id = identity::resolve_member_id(&BillerSettings::Qysso(settings.clone()), original)?;
    settings.member_id = Some(member_id);

    let biller_settings = BillerSettings::Qysso(settings);
    let snapshot = biller_settings.subsequent_operation_fields();

    Transaction::create(TransactionDraft {
        kind: TransactionKind::RebillUpdate {
            operation: RebillUpdateOperation::Stop,
        },
        biller_settings,
        charge_information: None,
        payment_information: None,
        payment_type,
        payment_method: None,
        previous_transaction_id,
        three_ds: ThreeDsState::default(),
        subsequent_operation_fields: Some(snapshot),
    })
}
