use crate::circuit::state::{CallOutcome, CircuitSnapshot, CircuitState, WindowStats};
use crate::repo::circuit_breaker_config_repo::CircuitThresholds;

pub fn apply_transition(
    mut snapshot: CircuitSnapshot,
    thresholds: &CircuitThresholds,
    window_2m: WindowStats,
    window_5m: WindowStats,
    outcome: CallOutcome,
    was_probe: bool,
    now: chrono::DateTime<chrono::Utc>,
) -> CircuitSnapshot {
    snapshot.failure_rate_2m = window_2m.failure_rate;
    snapshot.timeout_rate_5m = window_5m.timeout_rate;

    if outcome == CallOutcome::Success {
        snapshot.consecutive_failures = 0;
        snapshot.success_streak += 1;
        if was_probe {
            snapshot.probe_total += 1;
            snapshot.probe_success += 1;
            snapshot.probe_failure_streak = 0;
        }
    } else {
        snapshot.consecutive_failures += 1;
        snapshot.success_streak = 0;
        if was_probe {
            snapshot.probe_total += 1;
            snapshot.probe_failure_streak += 1;
        }
    }

    match snapshot.state {
        CircuitState::Closed => {
            // Rates over too few requests say nothing about the biller.
            let failing = window_2m.requests >= thresholds.min_request_volume_2m
                && window_2m.failure_rate > thresholds.failure_rate_threshold_2m;
            let timing_out = window_5m.requests >= thresholds.min_request_volume_2m
                && window_5m.timeout_rate > thresholds.timeout_rate_threshold_5m;
            if failing || timing_out || snapshot.consecutive_failures >= thresholds.consecutive_failure_threshold
            {
                trip(&mut snapshot, thresholds, now);
            }
        }
        CircuitState::Open => {
            // The cooldown probe decides: a failed probe re-arms the cooldown.
            if was_probe && outcome != CallOutcome::Success {
                trip(&mut snapshot, thresholds, now);
            } else if snapshot.cooldown_until.is_some_and(|t| now >= t) {
                snapshot.state = CircuitState::HalfOpen;
                reset_probes(&mut snapshot);
            }
        }
        CircuitState::HalfOpen => {
            if snapshot.probe_failure_streak >= thresholds.half_open_consecutive_failure_reopen {
                trip(&mut snapshot, thresholds, now);
            } else if snapshot.success_streak >= thresholds.half_open_consecutive_success_close {
                close(&mut snapshot);
            } else if snapshot.probe_total >= thresholds.half_open_min_probe_count {
                let ratio = snapshot.probe_success as f64 / snapshot.probe_total as f64;
                if ratio >= thresholds.half_open_success_rate_close {
                    close(&mut snapshot);
                }
            }
        }
    }

    snapshot.updated_at = now;
    snapshot
}

fn trip(snapshot: &mut CircuitSnapshot, thresholds: &CircuitThresholds, now: chrono::DateTime<chrono::Utc>) {
    snapshot.state = CircuitState::Open;
    snapshot.opened_at = Some(now);
    snapshot.cooldown_until = Some(now + chrono::Duration::seconds(thresholds.cooldown_seconds as i64));
    reset_probes(snapshot);
}

fn close(snapshot: &mut CircuitSnapshot) {
    snapshot.state = CircuitState::Closed;
    snapshot.consecutive_failures = 0;
    snapshot.cooldown_until = None;
    reset_probes(snapshot);
}

fn reset_probes(snapshot: &mut CircuitSnapshot) {
    snapshot.probe_total = 0;
    snapshot.probe_success = 0;
    snapshot.probe_failure_streak = 0;
    snapshot.success_streak = 0;
}
