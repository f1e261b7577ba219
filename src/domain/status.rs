use crate::domain::error::IllegalStateTransition;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Declined,
    Aborted,
    Refunded,
    Chargedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Approve,
    Decline,
    Abort,
    Refund,
    Chargeback,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Pending,
        Status::Approved,
        Status::Declined,
        Status::Aborted,
        Status::Refunded,
        Status::Chargedback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Declined => "declined",
            Status::Aborted => "aborted",
            Status::Refunded => "refunded",
            Status::Chargedback => "chargedback",
        }
    }

    pub fn parse(value: &str) -> Option<Status> {
        Status::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Pending)
    }
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Approve,
        Operation::Decline,
        Operation::Abort,
        Operation::Refund,
        Operation::Chargeback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Approve => "approve",
            Operation::Decline => "decline",
            Operation::Abort => "abort",
            Operation::Refund => "refund",
            Operation::Chargeback => "chargeback",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The whole transaction lifecycle. Anything not listed here is rejected and
/// the caller keeps the status it already had.
pub fn transition(from: Status, operation: Operation) -> Result<Status, IllegalStateTransition> {
    match (from, operation) {
        (Status::Pending, Operation::Approve) => Ok(Status::Approved),
        (Status::Pending, Operation::Decline) => Ok(Status::Declined),
        (Status::Pending, Operation::Abort) => Ok(Status::Aborted),
        (Status::Aborted, Operation::Abort) => Ok(Status::Aborted),
        (Status::Approved, Operation::Refund) => Ok(Status::Refunded),
        (Status::Approved, Operation::Chargeback)
        | (Status::Refunded, Operation::Chargeback)
        | (Status::Chargedback, Operation::Chargeback) => Ok(Status::Chargedback),
        _ => Err(IllegalStateTransition { from, operation }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declined_has_no_way_out() {
        for op in Operation::ALL {
            assert!(transition(Status::Declined, op).is_err());
        }
    }

    #[test]
    fn parse_accepts_any_casing() {
        assert_eq!(Status::parse("Chargedback"), Some(Status::Chargedback));
        assert_eq!(Status::parse("APPROVED"), Some(Status::Approved));
        assert_eq!(Status::parse("settled"), None);
    }
}
