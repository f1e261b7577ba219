use crate::billers::{base_response, field_str, parse_object, OperationType, RawExchange, ResponseTranslator, TranslationError};
use crate::domain::biller_response::{BillerResponse, ResponseResult};
use crate::domain::biller_settings::BillerName;
use chrono::{DateTime, Utc};

pub struct PumapayTranslator;

impl ResponseTranslator for PumapayTranslator {
    fn biller(&self) -> BillerName {
        BillerName::Pumapay
    }

    fn translate(
        &self,
        operation: OperationType,
        exchange: &RawExchange,
        request_date: DateTime<Utc>,
        response_date: DateTime<Utc>,
    ) -> Result<BillerResponse, TranslationError> {
        let body = parse_object(BillerName::Pumapay, &exchange.response)?;

        if operation == OperationType::NewSale {
            let accepted = body.get("success").and_then(|v| v.as_bool()).unwrap_or(false);
            let result = if accepted {
                ResponseResult::Pending
            } else {
                ResponseResult::Aborted
            };
            let mut response = base_response(result, exchange, request_date, response_date);
            response.reason = field_str(&body, "message");
            response.biller_transaction_id = field_str(&body, "paymentId");
            return Ok(response);
        }

        let status = field_str(&body, "status").ok_or(TranslationError::MissingField {
            biller: BillerName::Pumapay,
            field: "status",
        })?;
        let result = match status.to_ascii_lowercase().as_str() {
            "approved" | "success" => ResponseResult::Approved,
            "declined" | "failed" => ResponseResult::Declined,
            "pending" => ResponseResult::Pending,
            _ => {
                return Err(TranslationError::UnexpectedValue {
                    biller: BillerName::Pumapay,
                    field: "status",
                    value: status,
                })
            }
        };

        let mut response = base_response(result, exchange, request_date, response_date);
        response.code = Some(status);
        response.reason = field_str(&body, "statusDescription");
        response.biller_transaction_id = field_str(&body, "paymentId");
        Ok(response)
    }
}
