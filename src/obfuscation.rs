use crate::domain::biller_settings::BillerName;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const BUNDLED_CONFIG: &str = include_str!("../config/obfuscation.json");

#[derive(Debug, Clone, Deserialize)]
pub struct ObfuscationConfig {
    pub mask: String,
    #[serde(default)]
    pub common: Vec<String>,
    #[serde(default)]
    pub billers: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Obfuscator {
    mask: String,
    common: HashSet<String>,
    per_biller: HashMap<BillerName, HashSet<String>>,
}

impl Obfuscator {
    pub fn bundled() -> Result<Self> {
        let config: ObfuscationConfig =
            serde_json::from_str(BUNDLED_CONFIG).context("bundled obfuscation config is invalid")?;
        Self::from_config(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading obfuscation config {}", path.display()))?;
        let config: ObfuscationConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing obfuscation config {}", path.display()))?;
        Self::from_config(config)
    }

    pub fn from_config(config: ObfuscationConfig) -> Result<Self> {
        let mut per_biller = HashMap::new();
        for (name, keys) in config.billers {
            let biller = name
                .parse::<BillerName>()
                .map_err(|e| anyhow::anyhow!("obfuscation config: {}", e))?;
            per_biller.insert(biller, keys.iter().map(|k| k.to_lowercase()).collect());
        }

        Ok(Self {
            mask: config.mask,
            common: config.common.iter().map(|k| k.to_lowercase()).collect(),
            per_biller,
        })
    }

    pub fn is_sensitive(&self, biller: BillerName, key: &str) -> bool {
        let key = key.to_lowercase();
        self.common.contains(&key)
            || self
                .per_biller
                .get(&biller)
                .is_some_and(|keys| keys.contains(&key))
    }

    /// Returns a copy of `payload` with every sensitive key masked, at any depth.
    pub fn obfuscate(&self, biller: BillerName, payload: &Value) -> Value {
        match payload {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    let masked = if self.is_sensitive(biller, key) && !value.is_null() {
                        Value::String(self.mask.clone())
                    } else {
                        self.obfuscate(biller, value)
                    };
                    out.insert(key.clone(), masked);
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.obfuscate(biller, v)).collect()),
            other => other.clone(),
        }
    }
}
