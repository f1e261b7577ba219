use crate::domain::error::ValidationError;
use crate::domain::payment_information::Sensitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillerName {
    Rocketgate,
    Netbilling,
    Epoch,
    Pumapay,
    Qysso,
    Legacy,
}

impl BillerName {
    pub const ALL: [BillerName; 6] = [
        BillerName::Rocketgate,
        BillerName::Netbilling,
        BillerName::Epoch,
        BillerName::Pumapay,
        BillerName::Qysso,
        BillerName::Legacy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BillerName::Rocketgate => "rocketgate",
            BillerName::Netbilling => "netbilling",
            BillerName::Epoch => "epoch",
            BillerName::Pumapay => "pumapay",
            BillerName::Qysso => "qysso",
            BillerName::Legacy => "legacy",
        }
    }
}

impl fmt::Display for BillerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillerName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BillerName::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown biller '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RocketgateSettings {
    pub merchant_id: String,
    pub merchant_password: Sensitive,
    pub merchant_customer_id: Option<String>,
    pub merchant_invoice_id: Option<String>,
    pub merchant_account: Option<String>,
    pub merchant_site_id: Option<String>,
    pub merchant_product_id: Option<String>,
    pub merchant_descriptor: Option<String>,
    pub ip_address: Option<String>,
    pub referring_merchant_id: Option<String>,
    pub shared_secret: Option<Sensitive>,
    #[serde(default)]
    pub simplified_3ds: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetbillingSettings {
    pub site_tag: String,
    pub account_id: String,
    pub merchant_password: Sensitive,
    pub initial_days: Option<u32>,
    pub ip_address: Option<String>,
    pub browser: Option<String>,
    pub host: Option<String>,
    pub bin_routing: Option<String>,
    pub member_id: Option<String>,
    #[serde(default)]
    pub disable_fraud_checks: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochSettings {
    pub client_id: String,
    pub client_key: Sensitive,
    pub client_verification_key: Sensitive,
    pub redirect_url: String,
    pub notification_url: String,
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumapaySettings {
    pub business_id: String,
    pub business_model: String,
    pub api_key: Sensitive,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QyssoSettings {
    pub company_num: String,
    pub personal_hash_key: Sensitive,
    pub redirect_url: String,
    pub notification_url: String,
    pub member_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySettings {
    pub legacy_member_id: Option<String>,
    pub return_url: String,
    pub postback_url: String,
    #[serde(default)]
    pub others: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "biller", rename_all = "lowercase")]
pub enum BillerSettings {
    Rocketgate(RocketgateSettings),
    Netbilling(NetbillingSettings),
    Epoch(EpochSettings),
    Pumapay(PumapaySettings),
    Qysso(QyssoSettings),
    Legacy(LegacySettings),
}

/// Identifiers captured when a subscription is first charged, so later
/// operations can address the same upstream record even when the caller
/// no longer supplies them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubsequentOperationFields {
    pub merchant_customer_id: Option<String>,
    pub merchant_invoice_id: Option<String>,
    pub merchant_account: Option<String>,
    pub member_id: Option<String>,
}

impl BillerSettings {
    pub fn biller_name(&self) -> BillerName {
        match self {
            BillerSettings::Rocketgate(_) => BillerName::Rocketgate,
            BillerSettings::Netbilling(_) => BillerName::Netbilling,
            BillerSettings::Epoch(_) => BillerName::Epoch,
            BillerSettings::Pumapay(_) => BillerName::Pumapay,
            BillerSettings::Qysso(_) => BillerName::Qysso,
            BillerSettings::Legacy(_) => BillerName::Legacy,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let biller = self.biller_name();
        let missing = |field: &'static str| ValidationError::MissingMerchantInformation { biller, field };

        match self {
            BillerSettings::Rocketgate(s) => {
                require(&s.merchant_id, "merchant_id").map_err(missing)?;
                require(s.merchant_password.expose(), "merchant_password").map_err(missing)?;
            }
            BillerSettings::Netbilling(s) => {
                require(&s.site_tag, "site_tag").map_err(missing)?;
                require(&s.account_id, "account_id").map_err(missing)?;
                require(s.merchant_password.expose(), "merchant_password").map_err(missing)?;
            }
            BillerSettings::Epoch(s) => {
                require(&s.client_id, "client_id").map_err(missing)?;
                require(s.client_key.expose(), "client_key").map_err(missing)?;
                require(s.client_verification_key.expose(), "client_verification_key")
                    .map_err(missing)?;
                require(&s.redirect_url, "redirect_url").map_err(missing)?;
                require(&s.notification_url, "notification_url").map_err(missing)?;
            }
            BillerSettings::Pumapay(s) => {
                require(&s.business_id, "business_id").map_err(missing)?;
                require(&s.business_model, "business_model").map_err(missing)?;
                require(s.api_key.expose(), "api_key").map_err(missing)?;
            }
            BillerSettings::Qysso(s) => {
                require(&s.company_num, "company_num").map_err(missing)?;
                require(s.personal_hash_key.expose(), "personal_hash_key").map_err(missing)?;
                require(&s.redirect_url, "redirect_url").map_err(missing)?;
                require(&s.notification_url, "notification_url").map_err(missing)?;
            }
            BillerSettings::Legacy(s) => {
                require(&s.return_url, "return_url").map_err(missing)?;
                require(&s.postback_url, "postback_url").map_err(missing)?;
            }
        }
        Ok(())
    }

    pub fn merchant_customer_id(&self) -> Option<&str> {
        match self {
            BillerSettings::Rocketgate(s) => non_blank(s.merchant_customer_id.as_deref()),
            _ => None,
        }
    }

    pub fn merchant_invoice_id(&self) -> Option<&str> {
        match self {
            BillerSettings::Rocketgate(s) => non_blank(s.merchant_invoice_id.as_deref()),
            BillerSettings::Epoch(s) => non_blank(s.invoice_id.as_deref()),
            _ => None,
        }
    }

    pub fn member_id(&self) -> Option<&str> {
        match self {
            BillerSettings::Netbilling(s) => non_blank(s.member_id.as_deref()),
            BillerSettings::Qysso(s) => non_blank(s.member_id.as_deref()),
            BillerSettings::Legacy(s) => non_blank(s.legacy_member_id.as_deref()),
            _ => None,
        }
    }

    pub fn subsequent_operation_fields(&self) -> SubsequentOperationFields {
        SubsequentOperationFields {
            merchant_customer_id: self.merchant_customer_id().map(str::to_string),
            merchant_invoice_id: self.merchant_invoice_id().map(str::to_string),
            merchant_account: match self {
                BillerSettings::Rocketgate(s) => s.merchant_account.clone(),
                _ => None,
            },
            member_id: self.member_id().map(str::to_string),
        }
    }
}

fn require(value: &str, field: &'static str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        Err(field)
    } else {
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
