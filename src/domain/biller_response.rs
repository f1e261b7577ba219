use crate::domain::error::DomainError;
use crate::domain::money::{Amount, Rebill};
use crate::domain::status::Operation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseResult {
    Approved,
    Declined,
    Aborted,
    Pending,
}

impl ResponseResult {
    /// The state-machine operation a response of this kind drives, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ResponseResult::Approved => Some(Operation::Approve),
            ResponseResult::Declined => Some(Operation::Decline),
            ResponseResult::Aborted => Some(Operation::Abort),
            ResponseResult::Pending => None,
        }
    }
}

/// Final amount and rebill reported by a postback when the sale amount was
/// provisional at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRefinement {
    pub amount: Amount,
    pub rebill: Option<Rebill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillerResponse {
    pub result: ResponseResult,
    pub code: Option<String>,
    pub reason: Option<String>,
    pub request_payload: Option<String>,
    pub response_payload: Option<String>,
    pub request_date: DateTime<Utc>,
    pub response_date: DateTime<Utc>,
    pub three_ds_auth_required: bool,
    pub three_ds_init_required: bool,
    pub three_ds_sca_required: bool,
    pub three_ds_version: Option<u8>,
    pub should_retry_without_three_d: bool,
    pub should_return_400: bool,
    pub is_nsf_transaction: bool,
    pub biller_transaction_id: Option<String>,
    pub processor: Option<String>,
    pub charge_refinement: Option<ChargeRefinement>,
}

impl BillerResponse {
    pub fn new(result: ResponseResult, request_date: DateTime<Utc>, response_date: DateTime<Utc>) -> Self {
        Self {
            result,
            code: None,
            reason: None,
            request_payload: None,
            response_payload: None,
            request_date,
            response_date,
            three_ds_auth_required: false,
            three_ds_init_required: false,
            three_ds_sca_required: false,
            three_ds_version: None,
            should_retry_without_three_d: false,
            should_return_400: false,
            is_nsf_transaction: false,
            biller_transaction_id: None,
            processor: None,
            charge_refinement: None,
        }
    }

    pub fn requires_three_d(&self) -> bool {
        self.three_ds_auth_required || self.three_ds_init_required || self.three_ds_sca_required
    }
}

/// 3DS versions only ever step down. An unset (or zero) version adopts
/// whatever the biller reports; a report above the current version means
/// the biller and the transaction disagree about the flow in progress.
pub fn reconcile_three_ds_version(current: Option<u8>, reported: Option<u8>) -> Result<Option<u8>, DomainError> {
    let current = current.filter(|v| *v > 0);
    let reported = match reported.filter(|v| *v > 0) {
        Some(v) => v,
        None => return Ok(current),
    };

    match current {
        None => Ok(Some(reported)),
        Some(c) if reported <= c => Ok(Some(reported)),
        Some(c) => Err(DomainError::InvalidThreedsVersion {
            current: c,
            reported,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_steps_down_but_never_up() {
        assert_eq!(reconcile_three_ds_version(None, Some(2)), Ok(Some(2)));
        assert_eq!(reconcile_three_ds_version(Some(0), Some(2)), Ok(Some(2)));
        assert_eq!(reconcile_three_ds_version(Some(2), Some(2)), Ok(Some(2)));
        assert_eq!(reconcile_three_ds_version(Some(2), Some(1)), Ok(Some(1)));
        assert_eq!(
            reconcile_three_ds_version(Some(1), Some(2)),
            Err(DomainError::InvalidThreedsVersion {
                current: 1,
                reported: 2
            })
        );
        assert_eq!(reconcile_three_ds_version(Some(1), None), Ok(Some(1)));
    }
}
