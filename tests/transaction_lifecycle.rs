mod common;

use billing_gateway::domain::biller_response::{ChargeRefinement, ResponseResult};
use billing_gateway::domain::biller_settings::{BillerName, BillerSettings};
use billing_gateway::domain::error::{DomainError, ValidationError};
use billing_gateway::domain::money::{Amount, ChargeInformation, Currency, Rebill, TaxAmount, TaxBreakdown};
use billing_gateway::domain::payment_information::Sensitive;
use billing_gateway::domain::status::Status;
use billing_gateway::domain::transaction::Transaction;
use billing_gateway::factory::{legacy, rocketgate};
use rust_decimal_macros::dec;

fn rocketgate_charge(use_three_d: bool) -> Transaction {
    rocketgate::create_charge(
        common::rocketgate_settings(),
        common::charge_request(common::usd(dec!(49.99)), common::new_card(), use_three_d),
    )
    .unwrap()
}

#[test]
fn approved_charge_can_be_refunded_then_charged_back() {
    let obfuscator = common::obfuscator();
    let mut tx = rocketgate_charge(false);
    assert_eq!(tx.status(), Status::Pending);
    assert_eq!(tx.charge_information().unwrap().amount().value(), dec!(49.99));

    let status = tx.apply_response(&common::response(ResponseResult::Approved), &obfuscator).unwrap();
    assert_eq!(status, Status::Approved);
    assert_eq!(tx.refund().unwrap(), Status::Refunded);
    assert_eq!(tx.chargeback().unwrap(), Status::Chargedback);
    assert_eq!(tx.chargeback().unwrap(), Status::Chargedback);
    assert!(tx.refund().is_err());
    assert_eq!(tx.status(), Status::Chargedback);
}

#[test]
fn declined_transaction_stays_declined() {
    let obfuscator = common::obfuscator();
    let mut tx = rocketgate_charge(false);
    tx.apply_response(&common::response(ResponseResult::Declined), &obfuscator).unwrap();
    assert_eq!(tx.status(), Status::Declined);

    let err = tx
        .apply_response(&common::response(ResponseResult::Approved), &obfuscator)
        .unwrap_err();
    assert!(matches!(err, DomainError::IllegalStateTransition(_)));
    assert_eq!(tx.status(), Status::Declined);
    assert_eq!(tx.biller_interactions().len(), 2);
}

#[test]
fn blank_merchant_password_is_rejected() {
    let mut settings = common::rocketgate_settings();
    settings.merchant_password = Sensitive::new("");

    let err = rocketgate::create_charge(
        settings,
        common::charge_request(common::usd(dec!(49.99)), common::new_card(), false),
    )
    .unwrap_err();

    assert_eq!(
        err,
        DomainError::Validation(ValidationError::MissingMerchantInformation {
            biller: BillerName::Rocketgate,
            field: "merchant_password",
        })
    );
}

#[test]
fn three_ds_version_only_steps_down() {
    let obfuscator = common::obfuscator();
    let mut tx = rocketgate_charge(true);

    let mut first = common::response(ResponseResult::Pending);
    first.three_ds_auth_required = true;
    first.three_ds_version = Some(2);
    assert_eq!(tx.apply_response(&first, &obfuscator).unwrap(), Status::Pending);
    assert_eq!(tx.three_ds().version, Some(2));
    assert!(tx.is_awaiting_three_d());

    let mut second = common::response(ResponseResult::Pending);
    second.three_ds_version = Some(1);
    tx.apply_response(&second, &obfuscator).unwrap();
    assert_eq!(tx.three_ds().version, Some(1));

    let interactions_before = tx.biller_interactions().len();
    let mut third = common::response(ResponseResult::Pending);
    third.three_ds_version = Some(2);
    let err = tx.apply_response(&third, &obfuscator).unwrap_err();

    assert_eq!(err, DomainError::InvalidThreedsVersion { current: 1, reported: 2 });
    assert_eq!(tx.three_ds().version, Some(1));
    assert_eq!(tx.biller_interactions().len(), interactions_before);
}

#[test]
fn three_ds_request_is_ignored_when_not_flagged() {
    let obfuscator = common::obfuscator();
    let mut tx = rocketgate_charge(false);

    let mut response = common::response(ResponseResult::Pending);
    response.three_ds_sca_required = true;
    response.three_ds_version = Some(2);
    let status = tx.apply_response(&response, &obfuscator).unwrap();

    assert_eq!(status, Status::Pending);
    assert_eq!(tx.three_ds().version, None);
    assert!(!tx.three_ds().sca_required);
    assert!(!tx.is_awaiting_three_d());
    assert_eq!(tx.biller_interactions().len(), 2);
}

#[test]
fn unparseable_payload_leaves_transaction_untouched() {
    let obfuscator = common::obfuscator();
    let mut tx = rocketgate_charge(false);
    let before = tx.clone();

    let mut response = common::response(ResponseResult::Approved);
    response.response_payload = Some("<html>502 Bad Gateway</html>".to_string());
    response.code = Some("0".to_string());
    let err = tx.apply_response(&response, &obfuscator).unwrap_err();

    assert!(matches!(err, DomainError::PayloadIntegrity(_)));
    assert_eq!(tx, before);
}

#[test]
fn nsf_and_response_details_are_recorded() {
    let obfuscator = common::obfuscator();
    let mut tx = rocketgate_charge(false);

    let mut response = common::response(ResponseResult::Declined);
    response.code = Some("105".to_string());
    response.reason = Some("Insufficient funds".to_string());
    response.biller_transaction_id = Some("RG-42".to_string());
    response.is_nsf_transaction = true;
    tx.apply_response(&response, &obfuscator).unwrap();

    assert!(tx.is_nsf());
    assert_eq!(tx.response_code(), Some("105"));
    assert_eq!(tx.response_reason(), Some("Insufficient funds"));
    assert_eq!(tx.biller_transaction_id(), Some("RG-42"));
}

#[test]
fn legacy_postback_refines_the_provisional_charge() {
    let obfuscator = common::obfuscator();
    let mut tx = legacy::create_new_sale(
        common::legacy_settings(),
        common::new_sale_request(common::usd(dec!(1.00))),
    )
    .unwrap();

    let rebill = Rebill::new(30, 30, Amount::new(dec!(24.95)).unwrap()).unwrap();
    let mut response = common::response(ResponseResult::Approved);
    response.charge_refinement = Some(ChargeRefinement {
        amount: Amount::new(dec!(29.95)).unwrap(),
        rebill: Some(rebill.clone()),
    });
    tx.apply_response(&response, &obfuscator).unwrap();

    let charge = tx.charge_information().unwrap();
    assert_eq!(tx.status(), Status::Approved);
    assert_eq!(charge.amount().value(), dec!(29.95));
    assert_eq!(charge.rebill(), Some(&rebill));
    assert_eq!(charge.currency().code(), "USD");
}

#[test]
fn legacy_postback_replaces_provisional_tax_figures() {
    let obfuscator = common::obfuscator();
    let tax = TaxBreakdown {
        initial_amount: Some(TaxAmount {
            before_tax: Amount::new(dec!(0.90)).unwrap(),
            after_tax: Amount::new(dec!(1.00)).unwrap(),
        }),
        tax_name: Some("VAT".to_string()),
        tax_rate: Some(dec!(0.10)),
        ..Default::default()
    };
    let charge = ChargeInformation::new(
        Amount::new(dec!(1.00)).unwrap(),
        Currency::new("USD").unwrap(),
        None,
        Some(tax),
    )
    .unwrap();
    let mut tx = legacy::create_new_sale(common::legacy_settings(), common::new_sale_request(charge)).unwrap();

    let mut response = common::response(ResponseResult::Approved);
    response.charge_refinement = Some(ChargeRefinement {
        amount: Amount::new(dec!(29.95)).unwrap(),
        rebill: None,
    });
    tx.apply_response(&response, &obfuscator).unwrap();

    assert_eq!(tx.status(), Status::Approved);
    assert_eq!(tx.biller_interactions().len(), 2);
    let charge = tx.charge_information().unwrap();
    assert_eq!(charge.amount().value(), dec!(29.95));
    let tax = charge.tax().unwrap();
    assert!(tax.initial_amount.is_none());
    assert_eq!(tax.tax_name.as_deref(), Some("VAT"));
    assert_eq!(tax.tax_rate, Some(dec!(0.10)));
}

#[test]
fn refinement_is_ignored_for_other_billers() {
    let obfuscator = common::obfuscator();
    let mut tx = rocketgate_charge(false);

    let mut response = common::response(ResponseResult::Approved);
    response.charge_refinement = Some(ChargeRefinement {
        amount: Amount::new(dec!(5.00)).unwrap(),
        rebill: None,
    });
    tx.apply_response(&response, &obfuscator).unwrap();

    assert_eq!(tx.charge_information().unwrap().amount().value(), dec!(49.99));
}

#[test]
fn free_sale_is_approved_without_a_response() {
    let mut tx = rocketgate::create_charge(
        common::rocketgate_settings(),
        common::charge_request(common::usd(dec!(0)), common::new_card(), false),
    )
    .unwrap();

    assert!(tx.is_free_sale());
    assert_eq!(tx.approve_free_sale().unwrap(), Status::Approved);
    assert!(tx.biller_interactions().is_empty());

    let mut paid = rocketgate_charge(false);
    assert_eq!(
        paid.approve_free_sale().unwrap_err(),
        DomainError::Validation(ValidationError::NotFreeSale)
    );
}

#[test]
fn document_round_trip_preserves_the_aggregate() {
    let obfuscator = common::obfuscator();
    let mut tx = rocketgate_charge(true);
    let mut response = common::response(ResponseResult::Pending);
    response.three_ds_init_required = true;
    response.three_ds_version = Some(2);
    tx.apply_response(&response, &obfuscator).unwrap();

    let document = tx.to_document().unwrap();
    assert_eq!(document["biller_name"], "rocketgate");
    assert_eq!(document["status"], "pending");

    let restored = Transaction::from_document(document).unwrap();
    assert_eq!(restored, tx);
    assert!(matches!(restored.biller_settings(), BillerSettings::Rocketgate(_)));
}

#[test]
fn document_with_mismatched_biller_is_rejected() {
    let tx = rocketgate_charge(false);
    let mut document = tx.to_document().unwrap();
    document["biller_name"] = serde_json::json!("netbilling");

    assert!(matches!(
        Transaction::from_document(document),
        Err(DomainError::MalformedDocument(_))
    ));
}
