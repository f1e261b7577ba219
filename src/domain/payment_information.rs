use crate::domain::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A value that must never show up in logs. Serialization is transparent so
/// outbound calls and persistence still see the real value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sensitive(String);

impl Sensitive {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sensitive(****)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cc,
    Checks,
    Cryptocurrency,
    Banktransfer,
    Ewallet,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cc => "cc",
            PaymentType::Checks => "checks",
            PaymentType::Cryptocurrency => "cryptocurrency",
            PaymentType::Banktransfer => "banktransfer",
            PaymentType::Ewallet => "ewallet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingAddress {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCreditCard {
    pub number: Sensitive,
    pub cvv: Sensitive,
    pub expiration_month: u8,
    pub expiration_year: u16,
    pub owner: Owner,
    pub billing_address: Option<BillingAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedCreditCard {
    pub card_hash: Sensitive,
    pub merchant_customer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankCheck {
    pub routing_number: Sensitive,
    pub account_number: Sensitive,
    pub saving_account: bool,
    pub social_security_last4: Option<String>,
    pub owner: Owner,
    pub billing_address: Option<BillingAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentInformation {
    NewCreditCard(NewCreditCard),
    TokenizedCreditCard(TokenizedCreditCard),
    BankCheck(BankCheck),
    Crypto,
}

impl NewCreditCard {
    pub fn new(
        number: &str,
        cvv: &str,
        expiration_month: u8,
        expiration_year: u16,
        owner: Owner,
        billing_address: Option<BillingAddress>,
    ) -> Result<Self, ValidationError> {
        let number = number.trim();
        if !(12..=19).contains(&number.len()) || !all_digits(number) {
            return Err(ValidationError::InvalidPaymentInformation(
                "card number must be 12 to 19 digits".to_string(),
            ));
        }
        if !(3..=4).contains(&cvv.len()) || !all_digits(cvv) {
            return Err(ValidationError::InvalidPaymentInformation(
                "cvv must be 3 or 4 digits".to_string(),
            ));
        }
        if !(1..=12).contains(&expiration_month) {
            return Err(ValidationError::InvalidPaymentInformation(format!(
                "expiration month {} is out of range",
                expiration_month
            )));
        }
        if expiration_year < 2000 {
            return Err(ValidationError::InvalidPaymentInformation(format!(
                "expiration year {} is out of range",
                expiration_year
            )));
        }
        check_owner(&owner)?;

        Ok(Self {
            number: Sensitive::new(number),
            cvv: Sensitive::new(cvv),
            expiration_month,
            expiration_year,
            owner,
            billing_address,
        })
    }

    pub fn first_six(&self) -> &str {
        let n = self.number.expose();
        &n[..n.len().min(6)]
    }

    pub fn last_four(&self) -> &str {
        let n = self.number.expose();
        &n[n.len().saturating_sub(4)..]
    }
}

impl TokenizedCreditCard {
    pub fn new(card_hash: &str, merchant_customer_id: &str) -> Result<Self, ValidationError> {
        if card_hash.trim().is_empty() {
            return Err(ValidationError::InvalidPaymentInformation(
                "card hash is required".to_string(),
            ));
        }
        if merchant_customer_id.trim().is_empty() {
            return Err(ValidationError::InvalidPaymentInformation(
                "merchant customer id is required for a tokenized card".to_string(),
            ));
        }
        Ok(Self {
            card_hash: Sensitive::new(card_hash),
            merchant_customer_id: merchant_customer_id.to_string(),
        })
    }
}

impl BankCheck {
    pub fn new(
        routing_number: &str,
        account_number: &str,
        saving_account: bool,
        social_security_last4: Option<String>,
        owner: Owner,
        billing_address: Option<BillingAddress>,
    ) -> Result<Self, ValidationError> {
        if routing_number.len() != 9 || !all_digits(routing_number) {
            return Err(ValidationError::InvalidPaymentInformation(
                "routing number must be 9 digits".to_string(),
            ));
        }
        if account_number.is_empty() || !all_digits(account_number) {
            return Err(ValidationError::InvalidPaymentInformation(
                "account number must be digits".to_string(),
            ));
        }
        if let Some(ssn) = &social_security_last4 {
            if ssn.len() != 4 || !all_digits(ssn) {
                return Err(ValidationError::InvalidPaymentInformation(
                    "social security suffix must be 4 digits".to_string(),
                ));
            }
        }
        check_owner(&owner)?;

        Ok(Self {
            routing_number: Sensitive::new(routing_number),
            account_number: Sensitive::new(account_number),
            saving_account,
            social_security_last4,
            owner,
            billing_address,
        })
    }
}

impl PaymentInformation {
    pub fn payment_type(&self) -> PaymentType {
        match self {
            PaymentInformation::NewCreditCard(_) | PaymentInformation::TokenizedCreditCard(_) => {
                PaymentType::Cc
            }
            PaymentInformation::BankCheck(_) => PaymentType::Checks,
            PaymentInformation::Crypto => PaymentType::Cryptocurrency,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PaymentInformation::NewCreditCard(_) => "new_credit_card",
            PaymentInformation::TokenizedCreditCard(_) => "tokenized_credit_card",
            PaymentInformation::BankCheck(_) => "bank_check",
            PaymentInformation::Crypto => "crypto",
        }
    }

    /// Safe to log.
    pub fn redacted(&self) -> Value {
        match self {
            PaymentInformation::NewCreditCard(card) => json!({
                "kind": self.kind(),
                "first_six": card.first_six(),
                "last_four": card.last_four(),
                "expiration_month": card.expiration_month,
                "expiration_year": card.expiration_year,
                "owner_email": card.owner.email,
            }),
            PaymentInformation::TokenizedCreditCard(token) => json!({
                "kind": self.kind(),
                "merchant_customer_id": token.merchant_customer_id,
            }),
            PaymentInformation::BankCheck(check) => json!({
                "kind": self.kind(),
                "account_last_four": last_chars(check.account_number.expose(), 4),
                "saving_account": check.saving_account,
                "owner_email": check.owner.email,
            }),
            PaymentInformation::Crypto => json!({ "kind": self.kind() }),
        }
    }
}

fn check_owner(owner: &Owner) -> Result<(), ValidationError> {
    if owner.email.trim().is_empty() || !owner.email.contains('@') {
        return Err(ValidationError::InvalidPaymentInformation(
            "owner email is invalid".to_string(),
        ));
    }
    Ok(())
}

fn all_digits(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

fn last_chars(value: &str, n: usize) -> &str {
    &value[value.len().saturating_sub(n)..]
}
