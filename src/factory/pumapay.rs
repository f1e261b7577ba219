use crate::domain::biller_settings::{BillerSettings, PumapaySettings};
use crate::domain::error::DomainError;
use crate::domain::money::ChargeInformation;
use crate::domain::payment_information::{PaymentInformation, PaymentType};
use crate::domain::transaction::{ThreeDsState, Transaction, TransactionDraft, TransactionId, TransactionKind};

pub fn create_new_sale(
    settings: PumapaySettings,
    charge_information: ChargeInformation,
    previous_transaction_id: Option<TransactionId>,
) -> Result<Transaction, DomainError> {
    Transaction::create(TransactionDraft {
        kind: TransactionKind::Charge,
        biller_settings: BillerSettings::Pumapay(settings),
        charge_information: Some(charge_information),
        payment_information: Some(PaymentInformation::Crypto),
        payment_type: PaymentType::Cryptocurrency,
        payment_method: None,
        previous_transaction_id,
        three_ds: ThreeDsState::default(),
        subsequent_operation_fields: None,
    })
}
