#![allow(dead_code)]

use billing_gateway::adapter::BillerAdapter;
use billing_gateway::billers::mock::{MockBehavior, MockBillerClient};
use billing_gateway::circuit::{CircuitBreaker, CircuitStoreMemory};
use billing_gateway::domain::biller_response::{BillerResponse, ResponseResult};
use billing_gateway::domain::biller_settings::{
    BillerName, EpochSettings, LegacySettings, NetbillingSettings, QyssoSettings, RocketgateSettings,
};
use billing_gateway::domain::money::{Amount, ChargeInformation, Currency, Rebill};
use billing_gateway::domain::payment_information::{Owner, PaymentType, Sensitive};
use billing_gateway::factory::{ChargeRequest, NewSaleRequest, PaymentDetails, ThreeDOptions};
use billing_gateway::obfuscation::Obfuscator;
use billing_gateway::repo::circuit_breaker_config_repo::CircuitThresholds;
use billing_gateway::repo::error_classification_repo::StaticErrorClassifications;
use billing_gateway::repo::transaction_repo::InMemoryTransactionRepo;
use billing_gateway::service::charge_flow::ChargeFlow;
use billing_gateway::service::reconciler::TransactionReconciler;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub fn owner() -> Owner {
    Owner {
        first_name: "Ada".to_string(),
        last_name: "Byron".to_string(),
        email: "ada@example.com".to_string(),
    }
}

pub fn usd(amount: Decimal) -> ChargeInformation {
    ChargeInformation::new(Amount::new(amount).unwrap(), Currency::new("USD").unwrap(), None, None).unwrap()
}

pub fn usd_with_rebill(amount: Decimal, rebill_amount: Decimal) -> ChargeInformation {
    let rebill = Rebill::new(30, 30, Amount::new(rebill_amount).unwrap()).unwrap();
    ChargeInformation::new(
        Amount::new(amount).unwrap(),
        Currency::new("USD").unwrap(),
        Some(rebill),
        None,
    )
    .unwrap()
}

pub fn rocketgate_settings() -> RocketgateSettings {
    RocketgateSettings {
        merchant_id: "1234567".to_string(),
        merchant_password: Sensitive::new("s3cret-pass"),
        merchant_customer_id: None,
        merchant_invoice_id: None,
        merchant_account: Some("1".to_string()),
        merchant_site_id: Some("7".to_string()),
        merchant_product_id: None,
        merchant_descriptor: None,
        ip_address: Some("10.0.0.1".to_string()),
        referring_merchant_id: None,
        shared_secret: None,
        simplified_3ds: false,
    }
}

pub fn netbilling_settings() -> NetbillingSettings {
    NetbillingSettings {
        site_tag: "SITE1".to_string(),
        account_id: "ACC1".to_string(),
        merchant_password: Sensitive::new("nb-pass"),
        initial_days: None,
        ip_address: None,
        browser: None,
        host: None,
        bin_routing: None,
        member_id: None,
        disable_fraud_checks: false,
    }
}

pub fn epoch_settings() -> EpochSettings {
    EpochSettings {
        client_id: "client-1".to_string(),
        client_key: Sensitive::new("epoch-key"),
        client_verification_key: Sensitive::new("epoch-verify"),
        redirect_url: "https://shop.example.com/return".to_string(),
        notification_url: "https://shop.example.com/postback".to_string(),
        invoice_id: None,
    }
}

pub fn qysso_settings() -> QyssoSettings {
    QyssoSettings {
        company_num: "5000001".to_string(),
        personal_hash_key: Sensitive::new("qysso-hash"),
        redirect_url: "https://shop.example.com/return".to_string(),
        notification_url: "https://shop.example.com/postback".to_string(),
        member_id: None,
    }
}

pub fn legacy_settings() -> LegacySettings {
    LegacySettings {
        legacy_member_id: Some("LM-1".to_string()),
        return_url: "https://shop.example.com/return".to_string(),
        postback_url: "https://shop.example.com/postback".to_string(),
        others: BTreeMap::new(),
    }
}

pub fn new_card() -> PaymentDetails {
    PaymentDetails {
        card_number: Some("4111111111111111".to_string()),
        cvv: Some("123".to_string()),
        expiration_month: Some(12),
        expiration_year: Some(2030),
        owner: Some(owner()),
        ..Default::default()
    }
}

pub fn card_hash() -> PaymentDetails {
    PaymentDetails {
        card_hash: Some("hash-abc".to_string()),
        ..Default::default()
    }
}

pub fn charge_request(charge: ChargeInformation, payment: PaymentDetails, use_three_d: bool) -> ChargeRequest {
    ChargeRequest {
        charge_information: Some(charge),
        payment,
        three_d: ThreeDOptions {
            use_three_d,
            required_to_use_3d: false,
            return_url: None,
        },
        previous_transaction_id: None,
    }
}

pub fn new_sale_request(charge: ChargeInformation) -> NewSaleRequest {
    NewSaleRequest {
        charge_information: charge,
        payment_type: PaymentType::Cc,
        payment_method: Some("visa".to_string()),
        previous_transaction_id: None,
    }
}

pub fn obfuscator() -> Obfuscator {
    Obfuscator::bundled().unwrap()
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
}

/// A response as a translator would produce it, with JSON payloads.
pub fn response(result: ResponseResult) -> BillerResponse {
    let now = Utc::now();
    let mut r = BillerResponse::new(result, now, now);
    r.request_payload = Some(json!({"merchant_password": "s3cret-pass", "amount": "49.99"}).to_string());
    r.response_payload = Some(json!({"responseCode": "0"}).to_string());
    r
}

pub fn thresholds() -> CircuitThresholds {
    CircuitThresholds {
        consecutive_failure_threshold: 3,
        failure_rate_threshold_2m: 1.0,
        timeout_rate_threshold_5m: 1.0,
        half_open_probe_ratio: 1.0,
        ..Default::default()
    }
}

pub fn breaker(store: Arc<CircuitStoreMemory>, timeout: Duration) -> CircuitBreaker {
    CircuitBreaker::new(store, Arc::new(thresholds()), timeout)
}

pub fn mock_adapter(
    biller: BillerName,
    behavior: MockBehavior,
    store: Arc<CircuitStoreMemory>,
) -> (BillerAdapter, Arc<MockBillerClient>) {
    let client = Arc::new(MockBillerClient::new(biller, behavior).unwrap());
    let adapter = BillerAdapter::new(client.clone(), breaker(store, Duration::from_millis(200)));
    (adapter, client)
}

pub struct TestFlow {
    pub flow: ChargeFlow,
    pub client: Arc<MockBillerClient>,
    pub repo: Arc<InMemoryTransactionRepo>,
}

/// One biller behind a mock client, in-memory persistence and breaker state.
pub fn flow(biller: BillerName, behavior: MockBehavior, classifications: StaticErrorClassifications) -> TestFlow {
    flow_with_repo(biller, behavior, classifications, Arc::new(InMemoryTransactionRepo::new()))
}

pub fn flow_with_repo(
    biller: BillerName,
    behavior: MockBehavior,
    classifications: StaticErrorClassifications,
    repo: Arc<InMemoryTransactionRepo>,
) -> TestFlow {
    let (adapter, client) = mock_adapter(biller, behavior, Arc::new(CircuitStoreMemory::new()));
    let reconciler = TransactionReconciler::new(Arc::new(classifications), Arc::new(obfuscator()));
    let flow = ChargeFlow::new(vec![adapter], reconciler, repo.clone());
    TestFlow { flow, client, repo }
}
