use crate::billers::{base_response, field_str, parse_object, OperationType, RawExchange, ResponseTranslator, TranslationError};
use crate::domain::biller_response::{BillerResponse, ResponseResult};
use crate::domain::biller_settings::BillerName;
use chrono::{DateTime, Utc};

pub struct NetbillingTranslator;

impl ResponseTranslator for NetbillingTranslator {
    fn biller(&self) -> BillerName {
        BillerName::Netbilling
    }

    fn translate(
        &self,
        _operation: OperationType,
        exchange: &RawExchange,
        request_date: DateTime<Utc>,
        response_date: DateTime<Utc>,
    ) -> Result<BillerResponse, TranslationError> {
        let body = parse_object(BillerName::Netbilling, &exchange.response)?;
        let status = field_str(&body, "status_code").ok_or(TranslationError::MissingField {
            biller: BillerName::Netbilling,
            field: "status_code",
        })?;

        // 1 approved, T/I approved pending settlement, 0 declined, D duplicate.
        let result = match status.as_str() {
            "1" | "T" | "I" => ResponseResult::Approved,
            "0" | "D" => ResponseResult::Declined,
            "F" => ResponseResult::Aborted,
            other => {
                return Err(TranslationError::UnexpectedValue {
                    biller: BillerName::Netbilling,
                    field: "status_code",
                    value: other.to_string(),
                })
            }
        };

        let message = field_str(&body, "auth_msg");
        let mut response = base_response(result, exchange, request_date, response_date);
        response.code = Some(status);
        response.is_nsf_transaction = message
            .as_deref()
            .is_some_and(|m| m.to_ascii_uppercase().contains("INSUFFICIENT FUNDS"));
        response.reason = message;
        response.processor = field_str(&body, "processor");
        response.biller_transaction_id = field_str(&body, "trans_id");
        Ok(response)
    }
}
