use crate::billers::{base_response, field_str, parse_object, OperationType, RawExchange, ResponseTranslator, TranslationError};
use crate::domain::biller_response::{BillerResponse, ResponseResult};
use crate::domain::biller_settings::BillerName;
use chrono::{DateTime, Utc};

const REPLY_SUCCESS: &str = "000";
const REPLY_PENDING: &str = "553";

pub struct QyssoTranslator;

impl ResponseTranslator for QyssoTranslator {
    fn biller(&self) -> BillerName {
        BillerName::Qysso
    }

    fn translate(
        &self,
        operation: OperationType,
        exchange: &RawExchange,
        request_date: DateTime<Utc>,
        response_date: DateTime<Utc>,
    ) -> Result<BillerResponse, TranslationError> {
        let body = parse_object(BillerName::Qysso, &exchange.response)?;
        let reply = field_str(&body, "Reply").ok_or(TranslationError::MissingField {
            biller: BillerName::Qysso,
            field: "Reply",
        })?;

        let result = match (operation, reply.as_str()) {
            (OperationType::NewSale, REPLY_SUCCESS) | (OperationType::NewSale, REPLY_PENDING) => {
                ResponseResult::Pending
            }
            (_, REPLY_SUCCESS) => ResponseResult::Approved,
            (_, REPLY_PENDING) => ResponseResult::Pending,
            _ => ResponseResult::Declined,
        };

        let mut response = base_response(result, exchange, request_date, response_date);
        response.code = Some(reply);
        response.reason = field_str(&body, "ReplyDesc");
        response.biller_transaction_id = field_str(&body, "TransID");
        Ok(response)
    }
}
