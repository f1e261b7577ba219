mod common;

use billing_gateway::domain::biller_settings::{BillerName, BillerSettings, SubsequentOperationFields};
use billing_gateway::domain::error::{DomainError, ValidationError};
use billing_gateway::domain::payment_information::{PaymentInformation, PaymentType};
use billing_gateway::domain::transaction::{RebillUpdateOperation, TransactionKind};
use billing_gateway::factory::{epoch, netbilling, qysso, rocketgate, PaymentDetails, RebillUpdateRequest};
use rstest::rstest;
use rust_decimal_macros::dec;

fn bank_check() -> PaymentDetails {
    PaymentDetails {
        routing_number: Some("021000021".to_string()),
        account_number: Some("000123456789".to_string()),
        saving_account: true,
        owner: Some(common::owner()),
        ..Default::default()
    }
}

fn rebill_request(operation: RebillUpdateOperation, original: Option<SubsequentOperationFields>) -> RebillUpdateRequest {
    let charge = match operation {
        RebillUpdateOperation::Start | RebillUpdateOperation::Update => {
            Some(common::usd_with_rebill(dec!(0), dec!(19.95)))
        }
        _ => None,
    };
    RebillUpdateRequest {
        operation,
        charge_information: charge,
        payment: None,
        payment_type: PaymentType::Cc,
        original,
        previous_transaction_id: None,
    }
}

#[rstest]
#[case(common::new_card(), "new_credit_card", PaymentType::Cc)]
#[case(common::card_hash(), "tokenized_credit_card", PaymentType::Cc)]
#[case(bank_check(), "bank_check", PaymentType::Checks)]
fn rocketgate_picks_payment_variant(
    #[case] payment: PaymentDetails,
    #[case] kind: &str,
    #[case] payment_type: PaymentType,
) {
    let tx = rocketgate::create_charge(
        common::rocketgate_settings(),
        common::charge_request(common::usd(dec!(9.99)), payment, false),
    )
    .unwrap();

    let info = tx.payment_information().unwrap();
    assert_eq!(info.kind(), kind);
    assert_eq!(tx.payment_type(), payment_type);
    assert_eq!(tx.kind(), TransactionKind::Charge);
}

#[test]
fn mixed_payment_details_are_rejected() {
    let mut payment = common::new_card();
    payment.card_hash = Some("hash-abc".to_string());

    let err = rocketgate::create_charge(
        common::rocketgate_settings(),
        common::charge_request(common::usd(dec!(9.99)), payment, false),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::InvalidPaymentInformation(_))
    ));
}

#[test]
fn missing_ids_are_generated_and_snapshotted() {
    let tx = rocketgate::create_charge(
        common::rocketgate_settings(),
        common::charge_request(common::usd(dec!(9.99)), common::card_hash(), false),
    )
    .unwrap();

    let settings = tx.biller_settings();
    let customer_id = settings.merchant_customer_id().unwrap().to_string();
    let invoice_id = settings.merchant_invoice_id().unwrap().to_string();
    assert_ne!(customer_id, invoice_id);

    let snapshot = tx.subsequent_operation_fields().unwrap();
    assert_eq!(snapshot.merchant_customer_id.as_deref(), Some(customer_id.as_str()));
    assert_eq!(snapshot.merchant_invoice_id.as_deref(), Some(invoice_id.as_str()));
    assert_eq!(snapshot.merchant_account.as_deref(), Some("1"));

    match tx.payment_information().unwrap() {
        PaymentInformation::TokenizedCreditCard(token) => assert_eq!(token.merchant_customer_id, customer_id),
        other => panic!("unexpected payment {:?}", other),
    }
}

#[test]
fn supplied_ids_are_kept() {
    let mut settings = common::rocketgate_settings();
    settings.merchant_customer_id = Some("cust-1".to_string());
    settings.merchant_invoice_id = Some("inv-1".to_string());

    let tx = rocketgate::create_charge(
        settings,
        common::charge_request(common::usd(dec!(9.99)), common::new_card(), false),
    )
    .unwrap();

    assert_eq!(tx.biller_settings().merchant_customer_id(), Some("cust-1"));
    assert_eq!(tx.biller_settings().merchant_invoice_id(), Some("inv-1"));
}

#[test]
fn rebill_update_prefers_current_ids_over_snapshot() {
    let original = SubsequentOperationFields {
        merchant_customer_id: Some("cust-original".to_string()),
        merchant_invoice_id: Some("inv-original".to_string()),
        merchant_account: Some("3".to_string()),
        member_id: None,
    };
    let mut settings = common::rocketgate_settings();
    settings.merchant_customer_id = Some("cust-now".to_string());
    settings.merchant_account = None;

    let tx = rocketgate::create_rebill_update(
        settings,
        rebill_request(RebillUpdateOperation::Update, Some(original)),
    )
    .unwrap();

    assert_eq!(
        tx.kind(),
        TransactionKind::RebillUpdate {
            operation: RebillUpdateOperation::Update
        }
    );
    let fields = tx.subsequent_operation_fields().unwrap();
    assert_eq!(fields.merchant_customer_id.as_deref(), Some("cust-now"));
    assert_eq!(fields.merchant_invoice_id.as_deref(), Some("inv-original"));
    assert_eq!(fields.merchant_account.as_deref(), Some("3"));
    assert!(tx.payment_information().is_none());
}

#[test]
fn rebill_update_without_any_ids_fails() {
    let err = rocketgate::create_rebill_update(
        common::rocketgate_settings(),
        rebill_request(RebillUpdateOperation::Stop, None),
    )
    .unwrap_err();

    assert_eq!(
        err,
        DomainError::MissingSubsequentOperationField {
            biller: BillerName::Rocketgate,
            field: "merchant_customer_id",
        }
    );
}

#[test]
fn rebill_start_needs_a_rebill() {
    let mut request = rebill_request(RebillUpdateOperation::Start, None);
    request.charge_information = Some(common::usd(dec!(0)));

    let err = rocketgate::create_rebill_update(common::rocketgate_settings(), request).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::MissingChargeInformation(_))
    ));
}

#[test]
fn netbilling_refuses_checks() {
    let err = netbilling::create_charge(
        common::netbilling_settings(),
        common::charge_request(common::usd(dec!(9.99)), bank_check(), false),
    )
    .unwrap_err();

    assert_eq!(
        err,
        DomainError::Validation(ValidationError::UnsupportedPaymentMethod {
            biller: BillerName::Netbilling,
            payment: "bank_check",
        })
    );
}

#[test]
fn netbilling_suspend_resolves_member_id_from_original() {
    let original = SubsequentOperationFields {
        member_id: Some("member-9".to_string()),
        ..Default::default()
    };

    let tx = netbilling::create_rebill_update(
        common::netbilling_settings(),
        rebill_request(RebillUpdateOperation::Suspend, Some(original)),
    )
    .unwrap();

    assert_eq!(tx.biller_settings().member_id(), Some("member-9"));
    assert!(tx.charge_information().is_none());
}

#[test]
fn epoch_sale_generates_invoice_and_has_no_payment() {
    let tx = epoch::create_new_sale(
        common::epoch_settings(),
        common::new_sale_request(common::usd(dec!(19.99))),
    )
    .unwrap();

    assert!(tx.payment_information().is_none());
    assert_eq!(tx.payment_method(), Some("visa"));
    assert!(tx.biller_settings().merchant_invoice_id().is_some());
    assert!(matches!(tx.biller_settings(), BillerSettings::Epoch(_)));
}

#[test]
fn qysso_cancel_needs_member_id() {
    let err = qysso::create_rebill_cancel(common::qysso_settings(), None, PaymentType::Cc, None).unwrap_err();
    assert!(matches!(err, DomainError::MissingSubsequentOperationField { .. }));

    let original = SubsequentOperationFields {
        member_id: Some("q-77".to_string()),
        ..Default::default()
    };
    let tx = qysso::create_rebill_cancel(common::qysso_settings(), Some(&original), PaymentType::Cc, None).unwrap();
    assert_eq!(tx.rebill_operation(), Some(RebillUpdateOperation::Stop));
    assert_eq!(tx.biller_settings().member_id(), Some("q-77"));
}
