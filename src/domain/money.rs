use crate::domain::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

const KNOWN_CURRENCIES: &[&str] = &[
    "AED", "ARS", "AUD", "BGN", "BRL", "CAD", "CHF", "CLP", "CNY", "COP", "CZK", "DKK", "EUR",
    "GBP", "HKD", "HUF", "IDR", "ILS", "INR", "ISK", "JPY", "KRW", "MXN", "MYR", "NOK", "NZD",
    "PEN", "PHP", "PLN", "RON", "RUB", "SAR", "SEK", "SGD", "THB", "TRY", "TWD", "UAH", "USD",
    "ZAR",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeAmount(value));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        if KNOWN_CURRENCIES.contains(&code) {
            Ok(Self(code.to_string()))
        } else {
            Err(ValidationError::UnknownCurrency(code.to_string()))
        }
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RebillFields")]
pub struct Rebill {
    frequency_days: u32,
    start_days: u32,
    amount: Amount,
}

#[derive(Deserialize)]
struct RebillFields {
    frequency_days: u32,
    start_days: u32,
    amount: Amount,
}

impl TryFrom<RebillFields> for Rebill {
    type Error = ValidationError;

    fn try_from(f: RebillFields) -> Result<Self, Self::Error> {
        Rebill::new(f.frequency_days, f.start_days, f.amount)
    }
}

impl Rebill {
    pub fn new(frequency_days: u32, start_days: u32, amount: Amount) -> Result<Self, ValidationError> {
        if frequency_days == 0 {
            return Err(ValidationError::InvalidRebill {
                field: "frequency_days",
            });
        }
        if start_days == 0 {
            return Err(ValidationError::InvalidRebill { field: "start_days" });
        }
        Ok(Self {
            frequency_days,
            start_days,
            amount,
        })
    }

    pub fn frequency_days(&self) -> u32 {
        self.frequency_days
    }

    pub fn start_days(&self) -> u32 {
        self.start_days
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAmount {
    pub before_tax: Amount,
    pub after_tax: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub initial_amount: Option<TaxAmount>,
    pub rebill_amount: Option<TaxAmount>,
    pub tax_name: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub tax_application_id: Option<String>,
    pub tax_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChargeInformationFields")]
pub struct ChargeInformation {
    amount: Amount,
    currency: Currency,
    rebill: Option<Rebill>,
    tax: Option<TaxBreakdown>,
}

#[derive(Deserialize)]
struct ChargeInformationFields {
    amount: Amount,
    currency: Currency,
    #[serde(default)]
    rebill: Option<Rebill>,
    #[serde(default)]
    tax: Option<TaxBreakdown>,
}

impl TryFrom<ChargeInformationFields> for ChargeInformation {
    type Error = ValidationError;

    fn try_from(f: ChargeInformationFields) -> Result<Self, Self::Error> {
        ChargeInformation::new(f.amount, f.currency, f.rebill, f.tax)
    }
}

impl ChargeInformation {
    pub fn new(
        amount: Amount,
        currency: Currency,
        rebill: Option<Rebill>,
        tax: Option<TaxBreakdown>,
    ) -> Result<Self, ValidationError> {
        if let Some(tax) = &tax {
            check_tax(tax, amount, rebill.as_ref())?;
        }
        Ok(Self {
            amount,
            currency,
            rebill,
            tax,
        })
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn rebill(&self) -> Option<&Rebill> {
        self.rebill.as_ref()
    }

    pub fn tax(&self) -> Option<&TaxBreakdown> {
        self.tax.as_ref()
    }

    /// Rebuilds the charge with a final amount and rebill. The provisional
    /// after-tax figures described the old amounts, so they are dropped;
    /// tax name, rate and type carry over.
    pub fn refined(&self, amount: Amount, rebill: Option<Rebill>) -> Result<Self, ValidationError> {
        let tax = self.tax.as_ref().map(|tax| TaxBreakdown {
            initial_amount: None,
            rebill_amount: None,
            ..tax.clone()
        });
        ChargeInformation::new(amount, self.currency.clone(), rebill, tax)
    }
}

fn check_tax(tax: &TaxBreakdown, amount: Amount, rebill: Option<&Rebill>) -> Result<(), ValidationError> {
    if let Some(initial) = &tax.initial_amount {
        if initial.after_tax != amount {
            return Err(ValidationError::TaxMismatch(format!(
                "initial after-tax amount {} differs from charge amount {}",
                initial.after_tax, amount
            )));
        }
        if initial.before_tax > initial.after_tax {
            return Err(ValidationError::TaxMismatch(
                "initial before-tax amount exceeds after-tax amount".to_string(),
            ));
        }
    }

    if let Some(rebill_tax) = &tax.rebill_amount {
        let rebill = rebill.ok_or_else(|| {
            ValidationError::TaxMismatch("rebill tax given without a rebill".to_string())
        })?;
        if rebill_tax.after_tax != rebill.amount() {
            return Err(ValidationError::TaxMismatch(format!(
                "rebill after-tax amount {} differs from rebill amount {}",
                rebill_tax.after_tax,
                rebill.amount()
            )));
        }
        if rebill_tax.before_tax > rebill_tax.after_tax {
            return Err(ValidationError::TaxMismatch(
                "rebill before-tax amount exceeds after-tax amount".to_string(),
            ));
        }
    }

    Ok(())
}
