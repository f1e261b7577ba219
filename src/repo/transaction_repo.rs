use crate::domain::biller_settings::BillerName;
use crate::domain::status::Status;
use crate::domain::transaction::{Transaction, TransactionId};
use crate::repo::transaction_document::read_document;
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct TransactionCriteria {
    pub biller: Option<BillerName>,
    pub status: Option<Status>,
    pub previous_transaction_id: Option<TransactionId>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl TransactionCriteria {
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.biller.map_or(true, |b| tx.biller_name() == b)
            && self.status.map_or(true, |s| tx.status() == s)
            && self
                .previous_transaction_id
                .map_or(true, |id| tx.previous_transaction_id() == Some(id))
            && self.created_after.map_or(true, |t| tx.created_at() > t)
            && self.created_before.map_or(true, |t| tx.created_at() < t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    CreatedAtAsc,
    CreatedAtDesc,
}

#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn add(&self, tx: &Transaction) -> Result<()>;

    async fn update(&self, tx: &Transaction) -> Result<()>;

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>>;

    async fn find_all_by(
        &self,
        criteria: &TransactionCriteria,
        order_by: Option<OrderBy>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Transaction>>;
}

/// Keeps the serialized document, not the aggregate, so reads go through the
/// same document path as the database store.
#[derive(Clone, Default)]
pub struct InMemoryTransactionRepo {
    documents: Arc<RwLock<HashMap<TransactionId, Value>>>,
}

impl InMemoryTransactionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw document, e.g. one written by an older service version.
    pub async fn insert_document(&self, id: TransactionId, document: Value) {
        self.documents.write().await.insert(id, document);
    }
}

#[async_trait::async_trait]
impl TransactionRepository for InMemoryTransactionRepo {
    async fn add(&self, tx: &Transaction) -> Result<()> {
        let mut write = self.documents.write().await;
        if write.contains_key(&tx.id()) {
            bail!("transaction {} already exists", tx.id());
        }
        write.insert(tx.id(), tx.to_document()?);
        Ok(())
    }

    async fn update(&self, tx: &Transaction) -> Result<()> {
        let mut write = self.documents.write().await;
        match write.get_mut(&tx.id()) {
            Some(doc) => {
                *doc = tx.to_document()?;
                Ok(())
            }
            None => bail!("transaction {} not found", tx.id()),
        }
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let read = self.documents.read().await;
        match read.get(&id) {
            Some(doc) => Ok(Some(read_document(doc.clone())?)),
            None => Ok(None),
        }
    }

    async fn find_all_by(
        &self,
        criteria: &TransactionCriteria,
        order_by: Option<OrderBy>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        let read = self.documents.read().await;
        let mut found = Vec::new();
        for doc in read.values() {
            let tx = read_document(doc.clone())?;
            if criteria.matches(&tx) {
                found.push(tx);
            }
        }
        drop(read);

        match order_by.unwrap_or(OrderBy::CreatedAtAsc) {
            OrderBy::CreatedAtAsc => found.sort_by_key(|t| (t.created_at(), t.id())),
            OrderBy::CreatedAtDesc => {
                found.sort_by_key(|t| (t.created_at(), t.id()));
                found.reverse();
            }
        }

        Ok(found
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }
}
