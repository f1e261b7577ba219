use crate::billers::{base_response, field_str, parse_object, OperationType, RawExchange, ResponseTranslator, TranslationError};
use crate::domain::biller_response::{BillerResponse, ResponseResult};
use crate::domain::biller_settings::BillerName;
use chrono::{DateTime, Utc};

const REASON_NSF: &str = "105";
const REASON_3DS_AUTH_REQUIRED: &str = "202";
const REASON_3DS_FAILED: &str = "203";
const REASON_3DS_SCA_REQUIRED: &str = "225";
const REASON_3DS_INIT_REQUIRED: &str = "228";

pub struct RocketgateTranslator;

impl ResponseTranslator for RocketgateTranslator {
    fn biller(&self) -> BillerName {
        BillerName::Rocketgate
    }

    /// responseCode 0 approves, 1 and 2 are bank and risk declines, anything
    /// else is a gateway-side failure. 3DS hand-offs arrive as declines with
    /// a dedicated reason code and are reported as pending.
    fn translate(
        &self,
        _operation: OperationType,
        exchange: &RawExchange,
        request_date: DateTime<Utc>,
        response_date: DateTime<Utc>,
    ) -> Result<BillerResponse, TranslationError> {
        let body = parse_object(BillerName::Rocketgate, &exchange.response)?;
        let response_code = field_str(&body, "responseCode").ok_or(TranslationError::MissingField {
            biller: BillerName::Rocketgate,
            field: "responseCode",
        })?;
        let reason_code = field_str(&body, "reasonCode");
        let reason = reason_code.as_deref();

        let auth_required = reason == Some(REASON_3DS_AUTH_REQUIRED);
        let sca_required = reason == Some(REASON_3DS_SCA_REQUIRED);
        let init_required = reason == Some(REASON_3DS_INIT_REQUIRED);

        let result = match response_code.as_str() {
            "0" => ResponseResult::Approved,
            _ if auth_required || sca_required || init_required => ResponseResult::Pending,
            "1" | "2" => ResponseResult::Declined,
            _ => ResponseResult::Aborted,
        };

        let mut response = base_response(result, exchange, request_date, response_date);
        response.code = reason_code.clone().or(Some(response_code));
        response.reason = field_str(&body, "reasonDescription");
        response.biller_transaction_id = field_str(&body, "guidNo");
        response.three_ds_auth_required = auth_required;
        response.three_ds_sca_required = sca_required;
        response.three_ds_init_required = init_required;
        response.three_ds_version = field_str(&body, "_3DSECURE_VERSION").and_then(|v| v.parse::<u8>().ok());
        response.should_retry_without_three_d = reason == Some(REASON_3DS_FAILED);
        response.is_nsf_transaction = reason == Some(REASON_NSF);
        response.should_return_400 = reason.is_some_and(|r| r.starts_with('4') && r.len() == 3);
        Ok(response)
    }
}
