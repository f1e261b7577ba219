use crate::domain::biller_settings::{BillerSettings, LegacySettings};
use crate::domain::error::DomainError;
use crate::domain::transaction::{ThreeDsState, Transaction, TransactionDraft, TransactionKind};
use crate::factory::NewSaleRequest;

/// The amount given here is provisional: the legacy postback reports the
/// amount and rebill actually charged, and the transaction adopts them.
pub fn create_new_sale(settings: LegacySettings, request: NewSaleRequest) -> Result<Transaction, DomainError> {
    let biller_settings = BillerSettings::Legacy(settings);
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
