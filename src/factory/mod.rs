use crate::domain::biller_settings::SubsequentOperationFields;
use crate::domain::error::{DomainError, ValidationError};
use crate::domain::money::ChargeInformation;
use crate::domain::payment_information::{
    BankCheck, BillingAddress, NewCreditCard, Owner, PaymentInformation, PaymentType, TokenizedCreditCard,
};
use crate::domain::transaction::{
    RebillUpdateOperation, ThreeDsState, Transaction, TransactionDraft, TransactionId,
};

pub mod epoch;
pub mod legacy;
pub mod netbilling;
pub mod pumapay;
pub mod qysso;
pub mod rocketgate;

/// Raw payment fields as a caller supplies them. Exactly one family of
/// fields (new card, card hash, or bank account) must be present.
#[derive(Debug, Clone, Default)]
pub struct PaymentDetails {
    pub card_number: Option<String>,
    pub cvv: Option<String>,
    pub expiration_month: Option<u8>,
    pub expiration_year: Option<u16>,
    pub card_hash: Option<String>,
    pub routing_number: Option<String>,
    pub account_number: Option<String>,
    pub saving_account: bool,
    pub social_security_last4: Option<String>,
    pub owner: Option<Owner>,
    pub billing_address: Option<BillingAddress>,
}

impl PaymentDetails {
    pub fn into_payment_information(
        self,
        merchant_customer_id: Option<&str>,
    ) -> Result<PaymentInformation, ValidationError> {
        let has_card = present(&self.card_number);
        let has_token = present(&self.card_hash);
        let has_check = present(&self.routing_number) || present(&self.account_number);

        match (has_card, has_token, has_check) {
            (true, false, false) => {
                let owner = self.owner.ok_or_else(|| invalid("card owner is required"))?;
                let card = NewCreditCard::new(
                    self.card_number.as_deref().unwrap_or_default(),
                    self.cvv.as_deref().ok_or_else(|| invalid("cvv is required"))?,
                    self.expiration_month
                        .ok_or_else(|| invalid("expiration month is required"))?,
                    self.expiration_year
                        .ok_or_else(|| invalid("expiration year is required"))?,
                    owner,
                    self.billing_address,
                )?;
                Ok(PaymentInformation::NewCreditCard(card))
            }
            (false, true, false) => {
                let customer_id = merchant_customer_id
                    .ok_or_else(|| invalid("a card hash needs a merchant customer id"))?;
                let token = TokenizedCreditCard::new(self.card_hash.as_deref().unwrap_or_default(), customer_id)?;
                Ok(PaymentInformation::TokenizedCreditCard(token))
            }
            (false, false, true) => {
                let owner = self.owner.ok_or_else(|| invalid("account owner is required"))?;
                let check = BankCheck::new(
                    self.routing_number.as_deref().unwrap_or_default(),
                    self.account_number.as_deref().unwrap_or_default(),
                    self.saving_account,
                    self.social_security_last4,
                    owner,
                    self.billing_address,
                )?;
                Ok(PaymentInformation::BankCheck(check))
            }
            (false, false, false) => Err(invalid("no payment details supplied")),
            _ => Err(invalid("payment details mix card, card hash and bank account fields")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThreeDOptions {
    pub use_three_d: bool,
    pub required_to_use_3d: bool,
    pub return_url: Option<String>,
}

impl ThreeDOptions {
    pub(crate) fn into_state(self) -> ThreeDsState {
        ThreeDsState {
            with_3d: self.use_three_d,
            required_to_use_3d: self.required_to_use_3d,
            return_url: self.return_url,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub charge_information: Option<ChargeInformation>,
    pub payment: PaymentDetails,
    pub three_d: ThreeDOptions,
    pub previous_transaction_id: Option<TransactionId>,
}

#[derive(Debug, Clone)]
pub struct NewSaleRequest {
    pub charge_information: ChargeInformation,
    pub payment_type: PaymentType,
    pub payment_method: Option<String>,
    pub previous_transaction_id: Option<TransactionId>,
}

#[derive(Debug, Clone)]
pub struct RebillUpdateRequest {
    pub operation: RebillUpdateOperation,
    pub charge_information: Option<ChargeInformation>,
    pub payment: Option<PaymentDetails>,
    pub payment_type: PaymentType,
    pub original: Option<SubsequentOperationFields>,
    pub previous_transaction_id: Option<TransactionId>,
}

impl RebillUpdateRequest {
    /// Start and update need a rebill to apply; stop and suspend carry no
    /// charge or payment at all.
    pub(crate) fn check_shape(&self) -> Result<(), ValidationError> {
        match self.operation {
            RebillUpdateOperation::Start | RebillUpdateOperation::Update => {
                let has_rebill = self
                    .charge_information
                    .as_ref()
                    .is_some_and(|c| c.rebill().is_some());
                if !has_rebill {
                    return Err(ValidationError::MissingChargeInformation("a rebill start or update"));
                }
            }
            RebillUpdateOperation::Stop | RebillUpdateOperation::Suspend => {
                if self.charge_information.is_some() || self.payment.is_some() {
                    return Err(invalid("stopping or suspending a rebill takes no charge or payment"));
                }
            }
        }
        Ok(())
    }
}

/// A fresh pending attempt with the same charge and payment but 3DS turned
/// off, linked back to the attempt that asked for it.
pub fn retry_without_three_d(original: &Transaction) -> Result<Transaction, DomainError> {
    let mut three_ds = original.three_ds().clone();
    three_ds.with_3d = false;
    three_ds.auth_required = false;
    three_ds.init_required = false;
    three_ds.sca_required = false;

    Transaction::create(TransactionDraft {
        kind: original.kind(),
        biller_settings: original.biller_settings().clone(),
        charge_information: original.charge_information().cloned(),
        payment_information: original.payment_information().cloned(),
        payment_type: original.payment_type(),
        payment_method: original.payment_method().map(str::to_string),
        previous_transaction_id: Some(original.id()),
        three_ds,
        subsequent_operation_fields: original.subsequent_operation_fields().cloned(),
    })
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn invalid(message: &str) -> ValidationError {
    ValidationError::InvalidPaymentInformation(message.to_string())
}
