pub mod adapter;
pub mod billers;
pub mod circuit;
pub mod config;
pub mod domain {
    pub mod biller_response;
    pub mod biller_settings;
    pub mod cross_sale;
    pub mod error;
    pub mod error_classification;
    pub mod interaction;
    pub mod money;
    pub mod payment_information;
    pub mod status;
    pub mod transaction;
}
pub mod factory;
pub mod identity;
pub mod obfuscation;
pub mod repo {
    pub mod circuit_breaker_config_repo;
    pub mod error_classification_repo;
    pub mod pg_transaction_repo;
    pub mod transaction_document;
    pub mod transaction_repo;

    pub async fn run_migrations(pool: &sqlx::PgPool) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }
}
pub mod service {
    pub mod charge_flow;
    pub mod reconciler;
}
