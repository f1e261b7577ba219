use crate::billers::{base_response, field_str, parse_object, OperationType, RawExchange, ResponseTranslator, TranslationError};
use crate::domain::biller_response::{BillerResponse, ChargeRefinement, ResponseResult};
use crate::domain::biller_settings::BillerName;
use crate::domain::money::{Amount, Rebill};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

pub struct LegacyTranslator;

impl ResponseTranslator for LegacyTranslator {
    fn biller(&self) -> BillerName {
        BillerName::Legacy
    }

    fn translate(
        &self,
        operation: OperationType,
        exchange: &RawExchange,
        request_date: DateTime<Utc>,
        response_date: DateTime<Utc>,
    ) -> Result<BillerResponse, TranslationError> {
        let body = parse_object(BillerName::Legacy, &exchange.response)?;

        if operation == OperationType::NewSale {
            let result = if field_str(&body, "redirectUrl").is_some() {
                ResponseResult::Pending
            } else {
                ResponseResult::Aborted
            };
            let mut response = base_response(result, exchange, request_date, response_date);
            response.reason = field_str(&body, "error");
            return Ok(response);
        }

        let kind = field_str(&body, "type").ok_or(TranslationError::MissingField {
            biller: BillerName::Legacy,
            field: "type",
        })?;
        let result = match kind.to_ascii_lowercase().as_str() {
            "success" => ResponseResult::Approved,
            "decline" | "declined" => ResponseResult::Declined,
            "error" | "abort" => ResponseResult::Aborted,
            _ => {
                return Err(TranslationError::UnexpectedValue {
                    biller: BillerName::Legacy,
                    field: "type",
                    value: kind,
                })
            }
        };

        let mut response = base_response(result, exchange, request_date, response_date);
        response.code = field_str(&body, "errorCode");
        response.reason = field_str(&body, "errorMessage");
        response.biller_transaction_id = field_str(&body, "transId");
        if result == ResponseResult::Approved {
            response.charge_refinement = refinement(&body)?;
        }
        Ok(response)
    }
}

/// The postback states what was really charged. Absent amount means the
/// provisional figures stand.
fn refinement(body: &Map<String, Value>) -> Result<Option<ChargeRefinement>, TranslationError> {
    let amount = match decimal(body, "amount")? {
        Some(value) => amount_of(value, "amount")?,
        None => return Ok(None),
    };

    let rebill = match decimal(body, "rebillAmount")? {
        Some(value) => {
            let frequency = days(body, "rebillFrequency")?;
            let start = days(body, "rebillStart")?;
            let rebill = Rebill::new(frequency, start, amount_of(value, "rebillAmount")?).map_err(|e| {
                TranslationError::UnexpectedValue {
                    biller: BillerName::Legacy,
                    field: "rebill",
                    value: e.to_string(),
                }
            })?;
            Some(rebill)
        }
        None => None,
    };

    Ok(Some(ChargeRefinement { amount, rebill }))
}

fn decimal(body: &Map<String, Value>, key: &'static str) -> Result<Option<Decimal>, TranslationError> {
    match field_str(body, key) {
        Some(raw) => Decimal::from_str(&raw)
            .map(Some)
            .map_err(|_| TranslationError::UnexpectedValue {
                biller: BillerName::Legacy,
                field: key,
                value: raw,
            }),
        None => Ok(None),
    }
}

fn amount_of(value: Decimal, key: &'static str) -> Result<Amount, TranslationError> {
    Amount::new(value).map_err(|_| TranslationError::UnexpectedValue {
        biller: BillerName::Legacy,
        field: key,
        value: value.to_string(),
    })
}

fn days(body: &Map<String, Value>, key: &'static str) -> Result<u32, TranslationError> {
    let raw = field_str(body, key).ok_or(TranslationError::MissingField {
        biller: BillerName::Legacy,
        field: key,
    })?;
    raw.parse::<u32>().map_err(|_| TranslationError::UnexpectedValue {
        biller: BillerName::Legacy,
        field: key,
        value: raw,
    })
}
