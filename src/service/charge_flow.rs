use crate::adapter::BillerAdapter;
use crate::billers::{
    ChargeCommand, LookupThreeDsTwoCommand, NewSaleCommand, PostbackCommand, RebillUpdateCommand,
    ThreeDCompletionCommand,
};
use crate::domain::biller_response::BillerResponse;
use crate::domain::biller_settings::{BillerName, BillerSettings};
use crate::domain::cross_sale::ChargeBatch;
use crate::domain::payment_information::PaymentInformation;
use crate::domain::transaction::{Transaction, TransactionId, TransactionKind};
use crate::factory;
use crate::repo::transaction_repo::TransactionRepository;
use crate::service::reconciler::TransactionReconciler;
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// What the caller should do next. The flow never acts on these itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDirective {
    Completed,
    AwaitingThreeD,
    RetryWithoutThreeD,
    SkippedFreeSale,
}

#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub transaction: Transaction,
    pub response: Option<BillerResponse>,
    pub directive: RetryDirective,
}

#[derive(Clone)]
pub struct ChargeFlow {
    adapters: Arc<HashMap<BillerName, BillerAdapter>>,
    reconciler: TransactionReconciler,
    repository: Arc<dyn TransactionRepository>,
}

impl ChargeFlow {
    pub fn new(
        adapters: Vec<BillerAdapter>,
        reconciler: TransactionReconciler,
        repository: Arc<dyn TransactionRepository>,
    ) -> Self {
        let adapters = adapters.into_iter().map(|a| (a.biller(), a)).collect();
        Self {
            adapters: Arc::new(adapters),
            reconciler,
            repository,
        }
    }

    fn adapter(&self, biller: BillerName) -> Result<&BillerAdapter> {
        self.adapters
            .get(&biller)
            .ok_or_else(|| anyhow!("no adapter registered for {}", biller))
    }

    /// Persists a new transaction and sends it to its biller once. Free sales
    /// are approved without any biller call.
    pub async fn charge(&self, mut tx: Transaction) -> Result<ChargeOutcome> {
        self.repository.add(&tx).await?;

        if tx.kind() == TransactionKind::Charge && tx.is_free_sale() {
            tx.approve_free_sale()?;
            self.repository.update(&tx).await?;
            info!(transaction_id = %tx.id(), "free sale approved without biller call");
            return Ok(ChargeOutcome {
                transaction: tx,
                response: None,
                directive: RetryDirective::SkippedFreeSale,
            });
        }

        let adapter = self.adapter(tx.biller_name())?;
        info!(
            transaction_id = %tx.id(),
            biller = %tx.biller_name(),
            payment = %tx.payment_information().map(|p| p.redacted()).unwrap_or_default(),
            "sending transaction to biller"
        );
        let response = match (tx.kind(), tx.payment_information()) {
            (TransactionKind::RebillUpdate { .. }, _) => {
                adapter.rebill_update(RebillUpdateCommand::from_transaction(&tx)?).await
            }
            (TransactionKind::Charge, None) | (TransactionKind::Charge, Some(PaymentInformation::Crypto)) => {
                adapter.new_sale(NewSaleCommand::from_transaction(&tx)?).await
            }
            (TransactionKind::Charge, Some(_)) => adapter.charge(ChargeCommand::from_transaction(&tx)?).await,
        };

        self.finish(tx, response).await
    }

    /// Starts a fresh attempt with 3DS off, linked to `original`. Only ever
    /// called when the caller decides to follow a `RetryWithoutThreeD`.
    pub async fn retry_without_three_d(&self, original: &Transaction) -> Result<ChargeOutcome> {
        let retry = factory::retry_without_three_d(original)?;
        info!(
            transaction_id = %retry.id(),
            previous_transaction_id = %original.id(),
            "retrying charge without 3DS"
        );
        self.charge(retry).await
    }

    pub async fn complete_three_d(
        &self,
        id: TransactionId,
        pares: Option<String>,
        md: Option<String>,
    ) -> Result<ChargeOutcome> {
        let tx = self.load(id).await?;
        let adapter = self.adapter(tx.biller_name())?;
        let command = ThreeDCompletionCommand::from_transaction(&tx, pares, md)?;
        let simplified = matches!(tx.biller_settings(), BillerSettings::Rocketgate(s) if s.simplified_3ds);
        let response = if simplified {
            adapter.simplified_complete_three_d(command).await
        } else {
            adapter.complete_three_d(command).await
        };
        self.finish(tx, response).await
    }

    pub async fn lookup_three_ds_two(
        &self,
        id: TransactionId,
        device_fingerprint_id: Option<String>,
    ) -> Result<ChargeOutcome> {
        let tx = self.load(id).await?;
        let adapter = self.adapter(tx.biller_name())?;
        let response = adapter
            .lookup_three_ds_two(LookupThreeDsTwoCommand::from_transaction(&tx, device_fingerprint_id)?)
            .await;
        self.finish(tx, response).await
    }

    /// Applies an asynchronous biller notification to a pending sale.
    pub async fn handle_postback(&self, id: TransactionId, payload: Value) -> Result<ChargeOutcome> {
        let tx = self.load(id).await?;
        let adapter = self.adapter(tx.biller_name())?;
        let response = adapter
            .postback_translate(PostbackCommand {
                transaction_id: id,
                payload,
            })
            .await;
        self.finish(tx, response).await
    }

    /// Charges every line item concurrently. Items may complete in any order;
    /// results come back one per item, in item order, and a failed item does
    /// not stop the others.
    pub async fn charge_batch(&self, batch: ChargeBatch) -> Vec<Result<ChargeOutcome>> {
        info!(
            main_purchase = batch.main_purchase().is_some(),
            cross_sales = batch.cross_sales().count(),
            "charging batch"
        );
        let mut tasks = Vec::with_capacity(batch.len());
        for item in batch.into_items() {
            let flow = self.clone();
            tasks.push(tokio::spawn(async move { flow.charge(item.transaction).await }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(result) => results.push(result),
                Err(e) => results.push(Err(anyhow!("charge task failed: {}", e))),
            }
        }
        results
    }

    async fn load(&self, id: TransactionId) -> Result<Transaction> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("transaction {} not found", id))
    }

    async fn finish(&self, mut tx: Transaction, response: BillerResponse) -> Result<ChargeOutcome> {
        self.reconciler.apply(&mut tx, &response).await?;
        self.repository.update(&tx).await?;

        let directive = if response.should_retry_without_three_d {
            info!(transaction_id = %tx.id(), "biller suggests retrying without 3DS");
            RetryDirective::RetryWithoutThreeD
        } else if tx.is_awaiting_three_d() {
            RetryDirective::AwaitingThreeD
        } else {
            RetryDirective::Completed
        };

        Ok(ChargeOutcome {
            transaction: tx,
            response: Some(response),
            directive,
        })
    }
}
