use crate::domain::biller_settings::BillerName;
use crate::domain::error_classification::{ClassificationKey, ErrorClassification};
use anyhow::Result;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

/// Decline classification service. Lookups are best effort: callers treat
/// an error the same as "no classification".
#[async_trait::async_trait]
pub trait ErrorClassificationLookup: Send + Sync {
    async fn classify(&self, biller: BillerName, key: &ClassificationKey) -> Result<Option<ErrorClassification>>;
}

#[derive(Clone)]
pub struct ErrorClassificationRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl ErrorClassificationLookup for ErrorClassificationRepo {
    async fn classify(&self, biller: BillerName, key: &ClassificationKey) -> Result<Option<ErrorClassification>> {
        let row = sqlx::query(
            r#"
            SELECT group_decline, error_type, group_message, recommended_action
            FROM biller_error_classification
            WHERE biller=$1 AND discriminant=$2
            "#,
        )
        .bind(biller.as_str())
        .bind(key.discriminant())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ErrorClassification {
            group_decline: r.get("group_decline"),
            error_type: r.get("error_type"),
            group_message: r.get("group_message"),
            recommended_action: r.get("recommended_action"),
        }))
    }
}

/// Fixed table, for tests and for running without a database.
#[derive(Debug, Clone, Default)]
pub struct StaticErrorClassifications {
    entries: HashMap<(BillerName, String), ErrorClassification>,
}

impl StaticErrorClassifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, biller: BillerName, key: &ClassificationKey, classification: ErrorClassification) -> Self {
        self.entries.insert((biller, key.discriminant()), classification);
        self
    }
}

#[async_trait::async_trait]
impl ErrorClassificationLookup for StaticErrorClassifications {
    async fn classify(&self, biller: BillerName, key: &ClassificationKey) -> Result<Option<ErrorClassification>> {
        Ok(self.entries.get(&(biller, key.discriminant())).cloned())
    }
}
