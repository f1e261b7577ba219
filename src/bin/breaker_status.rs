use anyhow::{anyhow, bail, Result};
use billing_gateway::billers::supported_operations;
use billing_gateway::circuit::{CircuitOverride, CircuitStore, CircuitStoreRedis, CommandKey};
use billing_gateway::config::{AppConfig, CircuitStoreKind};
use billing_gateway::domain::biller_settings::BillerName;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: breaker_status <status [biller:operation ...] | force-open KEY | force-close KEY | clear KEY>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    if cfg.circuit_store == CircuitStoreKind::Memory {
        tracing::warn!("CIRCUIT_STORE is memory; breaker state lives in each service process, inspecting redis anyway");
    }
    let store = CircuitStoreRedis::new(redis::Client::open(cfg.redis_url.clone())?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).ok_or_else(|| anyhow!(USAGE))?;

    match command {
        "status" => {
            let keys = if args.len() > 1 {
                args[1..].iter().map(|a| parse_key(a)).collect::<Result<Vec<_>>>()?
            } else {
                all_keys()
            };
            for key in keys {
                let snapshot = store.get_snapshot(&key).await?;
                let manual = store.get_override(&key).await?;
                println!(
                    "{:<45} {:<9} fail_2m={:.2} timeout_5m={:.2} consecutive={} override={}",
                    key.to_string(),
                    format!("{:?}", snapshot.state),
                    snapshot.failure_rate_2m,
                    snapshot.timeout_rate_5m,
                    snapshot.consecutive_failures,
                    manual.map(|o| o.as_str()).unwrap_or("-"),
                );
            }
        }
        "force-open" | "force-close" | "clear" => {
            let key = parse_key(args.get(1).ok_or_else(|| anyhow!(USAGE))?)?;
            match command {
                "force-open" => store.set_override(&key, CircuitOverride::ForceOpen).await?,
                "force-close" => store.set_override(&key, CircuitOverride::ForceClosed).await?,
                _ => store.clear_override(&key).await?,
            }
            tracing::info!(key = %key, action = command, "breaker override updated");
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn parse_key(value: &str) -> Result<CommandKey> {
    CommandKey::parse(value).ok_or_else(|| anyhow!("'{}' is not a biller:operation key", value))
}

fn all_keys() -> Vec<CommandKey> {
    BillerName::ALL
        .into_iter()
        .flat_map(|biller| {
            supported_operations(biller)
                .iter()
                .map(move |op| CommandKey::new(biller, *op))
        })
        .collect()
}
