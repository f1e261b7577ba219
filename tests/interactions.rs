mod common;

use billing_gateway::domain::biller_settings::BillerName;
use billing_gateway::domain::error::DomainError;
use billing_gateway::domain::interaction::{BillerInteraction, InteractionLog, InteractionType};
use serde_json::json;

fn record(t: InteractionType, payload: serde_json::Value, second: i64) -> BillerInteraction {
    BillerInteraction::record(
        t,
        &payload.to_string(),
        common::at(second),
        BillerName::Rocketgate,
        &common::obfuscator(),
    )
    .unwrap()
}

#[test]
fn most_recent_response_is_chosen_by_timestamp() {
    let mut log = InteractionLog::new();
    log.append(record(InteractionType::Request, json!({"step": "late request"}), 30));
    log.append(record(InteractionType::Response, json!({"step": "newest"}), 20));
    log.append(record(InteractionType::Response, json!({"step": "oldest"}), 5));
    log.append(record(InteractionType::Request, json!({"step": "early request"}), 1));

    assert_eq!(log.most_recent_response_payload(), Some(&json!({"step": "newest"})));
    assert_eq!(log.most_recent_request().unwrap().payload()["step"], "late request");

    let ordered: Vec<i64> = log
        .sorted_by_created_at()
        .iter()
        .map(|i| i.created_at().timestamp() - 1_700_000_000)
        .collect();
    assert_eq!(ordered, vec![1, 5, 20, 30]);
}

#[test]
fn empty_log_has_no_response() {
    let log = InteractionLog::new();
    assert!(log.most_recent_response().is_none());
    assert!(log.is_empty());
}

#[test]
fn sensitive_fields_are_masked_at_any_depth() {
    let interaction = record(
        InteractionType::Request,
        json!({
            "merchant_id": "1234567",
            "merchantPassword": "s3cret",
            "payment": {
                "cardNo": "4111111111111111",
                "cvv2": "123",
                "cardHolder": "Ada Byron"
            },
            "history": [{"merchant_password": "old"}]
        }),
        0,
    );

    let payload = interaction.payload();
    assert_eq!(payload["merchant_id"], "1234567");
    assert_eq!(payload["merchantPassword"], "*******");
    assert_eq!(payload["payment"]["cardNo"], "*******");
    assert_eq!(payload["payment"]["cvv2"], "*******");
    assert_eq!(payload["payment"]["cardHolder"], "Ada Byron");
    assert_eq!(payload["history"][0]["merchant_password"], "*******");
}

#[test]
fn masking_rules_are_per_biller() {
    let obfuscator = common::obfuscator();
    assert!(obfuscator.is_sensitive(BillerName::Rocketgate, "cardNo"));
    assert!(!obfuscator.is_sensitive(BillerName::Epoch, "cardNo"));
    assert!(obfuscator.is_sensitive(BillerName::Epoch, "CVV"));
}

#[test]
fn non_json_payload_is_refused() {
    let err = BillerInteraction::record(
        InteractionType::Response,
        "status=ok&id=1",
        common::at(0),
        BillerName::Netbilling,
        &common::obfuscator(),
    )
    .unwrap_err();

    assert!(matches!(err, DomainError::PayloadIntegrity(_)));
}
