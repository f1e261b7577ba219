mod common;

use billing_gateway::adapter::BillerAdapter;
use billing_gateway::billers::mock::{MockBehavior, MockBillerClient};
use billing_gateway::billers::{ChargeCommand, NewSaleCommand, OperationType};
use billing_gateway::circuit::state::{CallOutcome, CircuitSnapshot, CircuitState, CommandKey, WindowStats};
use billing_gateway::circuit::transitions::apply_transition;
use billing_gateway::circuit::{CircuitBreaker, CircuitOverride, CircuitStore, CircuitStoreMemory};
use billing_gateway::config::{AppConfig, CircuitStoreKind};
use billing_gateway::domain::biller_response::ResponseResult;
use billing_gateway::domain::biller_settings::BillerName;
use billing_gateway::factory::rocketgate;
use billing_gateway::repo::circuit_breaker_config_repo::CircuitThresholds;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn opens_when_failure_rate_crosses_threshold() {
    let snapshot = CircuitSnapshot::new(charge_key());
    let thresholds = defaults();
    let now = chrono::Utc::now();

    let out = apply_transition(
        snapshot,
        &thresholds,
        window(20, 0.5, 0.1),
        window(20, 0.5, 0.1),
        CallOutcome::Failure,
        false,
        now,
    );
    assert_eq!(out.state, CircuitState::Open);
    assert_eq!(out.cooldown_until, Some(now + chrono::Duration::seconds(30)));
}

#[test]
fn rates_over_a_quiet_window_do_not_open() {
    let snapshot = CircuitSnapshot::new(charge_key());
    let now = chrono::Utc::now();

    let out = apply_transition(
        snapshot,
        &CircuitThresholds::default(),
        window(1, 1.0, 1.0),
        window(1, 1.0, 1.0),
        CallOutcome::Timeout,
        false,
        now,
    );
    assert_eq!(out.state, CircuitState::Closed);
    assert_eq!(out.consecutive_failures, 1);
    assert_eq!(out.failure_rate_2m, 1.0);
}

#[test]
fn timeout_rate_alone_opens_once_volume_is_reached() {
    let snapshot = CircuitSnapshot::new(charge_key());
    let now = chrono::Utc::now();

    let out = apply_transition(
        snapshot,
        &defaults(),
        window(5, 0.2, 0.2),
        window(25, 0.6, 0.6),
        CallOutcome::Timeout,
        false,
        now,
    );
    assert_eq!(out.state, CircuitState::Open);
}

#[test]
fn closes_half_open_on_success_streak() {
    let mut snapshot = CircuitSnapshot::new(charge_key());
    snapshot.state = CircuitState::HalfOpen;
    snapshot.success_streak = 4;

    let thresholds = defaults();
    let now = chrono::Utc::now();

    let out = apply_transition(
        snapshot,
        &thresholds,
        window(20, 0.1, 0.1),
        window(20, 0.1, 0.1),
        CallOutcome::Success,
        true,
        now,
    );
    assert_eq!(out.state, CircuitState::Closed);
}

#[test]
fn failed_probe_rearms_cooldown() {
    let now = chrono::Utc::now();
    let mut snapshot = CircuitSnapshot::new(charge_key());
    snapshot.state = CircuitState::Open;
    snapshot.cooldown_until = Some(now - chrono::Duration::seconds(1));

    let out = apply_transition(
        snapshot,
        &defaults(),
        window(20, 0.1, 0.1),
        window(20, 0.1, 0.1),
        CallOutcome::Timeout,
        true,
        now,
    );
    assert_eq!(out.state, CircuitState::Open);
    assert_eq!(out.cooldown_until, Some(now + chrono::Duration::seconds(30)));
}

#[test]
fn command_key_round_trips_through_operator_form() {
    let key = charge_key();
    assert_eq!(key.to_string(), "rocketgate:charge_new_card");
    assert_eq!(CommandKey::parse("rocketgate:charge_new_card"), Some(key));
    assert_eq!(CommandKey::parse("rocketgate:refund"), None);
    assert_eq!(CommandKey::parse("nobody:new_sale"), None);
}

#[tokio::test]
async fn forced_open_circuit_never_reaches_the_biller() {
    let store = Arc::new(CircuitStoreMemory::new());
    store.set_override(&charge_key(), CircuitOverride::ForceOpen).await.unwrap();
    let (adapter, client) = common::mock_adapter(BillerName::Rocketgate, MockBehavior::Approve, store);

    let response = adapter.charge(charge_command()).await;

    assert_eq!(response.result, ResponseResult::Aborted);
    assert_eq!(client.calls(), 0);
    assert!(response.reason.unwrap().contains("circuit open"));
    assert!(response.request_payload.is_some());
}

#[tokio::test]
async fn forced_closed_circuit_lets_calls_through_while_open() {
    let store = Arc::new(CircuitStoreMemory::new());
    let mut snapshot = CircuitSnapshot::new(charge_key());
    snapshot.state = CircuitState::Open;
    snapshot.cooldown_until = Some(chrono::Utc::now() + chrono::Duration::minutes(10));
    store.save_snapshot(&snapshot).await.unwrap();
    store.set_override(&charge_key(), CircuitOverride::ForceClosed).await.unwrap();
    let (adapter, client) = common::mock_adapter(BillerName::Rocketgate, MockBehavior::Approve, store);

    let response = adapter.charge(charge_command()).await;

    assert_eq!(response.result, ResponseResult::Approved);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn consecutive_failures_open_the_circuit() {
    let store = Arc::new(CircuitStoreMemory::new());
    let (adapter, client) =
        common::mock_adapter(BillerName::Rocketgate, MockBehavior::AlwaysFailure, store.clone());

    for _ in 0..3 {
        let response = adapter.charge(charge_command()).await;
        assert_eq!(response.result, ResponseResult::Aborted);
    }
    assert_eq!(client.calls(), 3);
    let snapshot = store.get_snapshot(&charge_key()).await.unwrap();
    assert_eq!(snapshot.state, CircuitState::Open);

    let rejected = adapter.charge(charge_command()).await;
    assert_eq!(rejected.result, ResponseResult::Aborted);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn breakers_are_isolated_per_operation() {
    let store = Arc::new(CircuitStoreMemory::new());
    store.set_override(&charge_key(), CircuitOverride::ForceOpen).await.unwrap();
    let (adapter, client) = common::mock_adapter(BillerName::Rocketgate, MockBehavior::Approve, store);

    let request = common::charge_request(common::usd(dec!(10.00)), common::card_hash(), false);
    let tx = rocketgate::create_charge(common::rocketgate_settings(), request).unwrap();
    let command = ChargeCommand::from_transaction(&tx).unwrap();
    assert_eq!(command.operation(), OperationType::ChargeExistingCard);

    let response = adapter.charge(command).await;
    assert_eq!(response.result, ResponseResult::Approved);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn slow_biller_times_out_as_aborted() {
    let store = Arc::new(CircuitStoreMemory::new());
    let (adapter, _client) =
        common::mock_adapter(BillerName::Rocketgate, MockBehavior::AlwaysTimeout, store.clone());

    let response = adapter.charge(charge_command()).await;

    assert_eq!(response.result, ResponseResult::Aborted);
    assert!(response.reason.unwrap().contains("timed out"));
    let snapshot = store.get_snapshot(&charge_key()).await.unwrap();
    assert_eq!(snapshot.consecutive_failures, 1);
}

#[tokio::test]
async fn unsupported_operation_is_aborted_without_accounting() {
    let store = Arc::new(CircuitStoreMemory::new());
    let (adapter, client) = common::mock_adapter(BillerName::Rocketgate, MockBehavior::Approve, store.clone());

    let epoch_tx = billing_gateway::factory::epoch::create_new_sale(
        common::epoch_settings(),
        common::new_sale_request(common::usd(dec!(19.99))),
    )
    .unwrap();
    let response = adapter.new_sale(NewSaleCommand::from_transaction(&epoch_tx).unwrap()).await;

    assert_eq!(response.result, ResponseResult::Aborted);
    assert_eq!(client.calls(), 0);
    let key = CommandKey::new(BillerName::Rocketgate, OperationType::NewSale);
    let stats = store.aggregate_window(&key, 5, chrono::Utc::now()).await.unwrap();
    assert_eq!(stats, WindowStats::default());
}

#[tokio::test]
async fn one_failure_with_default_thresholds_keeps_the_biller_reachable() {
    let store = Arc::new(CircuitStoreMemory::new());
    let breaker = CircuitBreaker::new(
        store.clone(),
        Arc::new(CircuitThresholds::default()),
        Duration::from_millis(200),
    );
    let failing = Arc::new(MockBillerClient::new(BillerName::Rocketgate, MockBehavior::AlwaysFailure).unwrap());
    let healthy = Arc::new(MockBillerClient::new(BillerName::Rocketgate, MockBehavior::Approve).unwrap());

    let first = BillerAdapter::new(failing.clone(), breaker.clone())
        .charge(charge_command())
        .await;
    assert_eq!(first.result, ResponseResult::Aborted);
    let snapshot = store.get_snapshot(&charge_key()).await.unwrap();
    assert_eq!(snapshot.state, CircuitState::Closed);

    let second = BillerAdapter::new(healthy.clone(), breaker).charge(charge_command()).await;
    assert_eq!(second.result, ResponseResult::Approved);
    assert_eq!(healthy.calls(), 1);
}

#[tokio::test]
async fn configured_breaker_bounds_calls_by_biller_timeout() {
    let config = AppConfig {
        database_url: String::new(),
        redis_url: String::new(),
        biller_timeout_ms: 50,
        circuit_store: CircuitStoreKind::Memory,
        obfuscation_config_path: None,
    };
    let breaker = config.circuit_breaker(Arc::new(CircuitThresholds::default())).unwrap();
    let client = Arc::new(MockBillerClient::new(BillerName::Rocketgate, MockBehavior::AlwaysTimeout).unwrap());

    let response = BillerAdapter::new(client, breaker).charge(charge_command()).await;

    assert_eq!(response.result, ResponseResult::Aborted);
    assert_eq!(response.reason.as_deref(), Some("biller call timed out after 50ms"));
}

#[tokio::test]
async fn window_counts_every_recorded_outcome() {
    let store = CircuitStoreMemory::new();
    let key = charge_key();
    let now = chrono::Utc::now();
    store.write_result(&key, CallOutcome::Success, now).await.unwrap();
    store.write_result(&key, CallOutcome::Failure, now).await.unwrap();
    store.write_result(&key, CallOutcome::Timeout, now).await.unwrap();
    store.write_result(&key, CallOutcome::Success, now).await.unwrap();

    let stats = store.aggregate_window(&key, 2, now).await.unwrap();
    assert_eq!(stats.requests, 4);
    assert_eq!(stats.failure_rate, 0.5);
    assert_eq!(stats.timeout_rate, 0.25);
}

fn charge_key() -> CommandKey {
    CommandKey::new(BillerName::Rocketgate, OperationType::ChargeNewCard)
}

fn charge_command() -> ChargeCommand {
    let tx = rocketgate::create_charge(
        common::rocketgate_settings(),
        common::charge_request(common::usd(dec!(49.99)), common::new_card(), false),
    )
    .unwrap();
    ChargeCommand::from_transaction(&tx).unwrap()
}

fn window(requests: u64, failure_rate: f64, timeout_rate: f64) -> WindowStats {
    WindowStats {
        requests,
        failure_rate,
        timeout_rate,
    }
}

fn defaults() -> CircuitThresholds {
    CircuitThresholds {
        min_request_volume_2m: 20,
        failure_rate_threshold_2m: 0.40,
        consecutive_failure_threshold: 10,
        timeout_rate_threshold_5m: 0.50,
        cooldown_seconds: 30,
        half_open_probe_ratio: 0.10,
        half_open_min_probe_count: 5,
        half_open_success_rate_close: 0.80,
        half_open_consecutive_success_close: 5,
        half_open_consecutive_failure_reopen: 3,
    }
}
