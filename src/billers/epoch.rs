use crate::billers::{base_response, field_str, parse_object, OperationType, RawExchange, ResponseTranslator, TranslationError};
use crate::domain::biller_response::{BillerResponse, ResponseResult};
use crate::domain::biller_settings::BillerName;
use chrono::{DateTime, Utc};

pub struct EpochTranslator;

impl ResponseTranslator for EpochTranslator {
    fn biller(&self) -> BillerName {
        BillerName::Epoch
    }

    fn translate(
        &self,
        operation: OperationType,
        exchange: &RawExchange,
        request_date: DateTime<Utc>,
        response_date: DateTime<Utc>,
    ) -> Result<BillerResponse, TranslationError> {
        let body = parse_object(BillerName::Epoch, &exchange.response)?;

        if operation == OperationType::NewSale {
            // The buyer finishes on Epoch's page; the outcome comes by postback.
            let redirect = field_str(&body, "redirectUrl");
            let result = if redirect.is_some() {
                ResponseResult::Pending
            } else {
                ResponseResult::Aborted
            };
            let mut response = base_response(result, exchange, request_date, response_date);
            response.reason = field_str(&body, "error");
            response.biller_transaction_id = field_str(&body, "sessionId");
            return Ok(response);
        }

        // Postbacks answer with `ans`: Y<code>|... approves, N<code>|... declines.
        let ans = field_str(&body, "ans").ok_or(TranslationError::MissingField {
            biller: BillerName::Epoch,
            field: "ans",
        })?;
        let result = match ans.chars().next() {
            Some('Y') | Some('y') => ResponseResult::Approved,
            Some('N') | Some('n') => ResponseResult::Declined,
            _ => {
                return Err(TranslationError::UnexpectedValue {
                    biller: BillerName::Epoch,
                    field: "ans",
                    value: ans,
                })
            }
        };

        let mut parts = ans.splitn(2, '|');
        let code = parts.next().map(|head| head[1..].to_string()).filter(|c| !c.is_empty());
        let reason = parts.next().map(str::to_string);

        let mut response = base_response(result, exchange, request_date, response_date);
        response.code = code;
        response.reason = reason;
        response.biller_transaction_id = field_str(&body, "order_id");
        Ok(response)
    }
}
