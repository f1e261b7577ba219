use crate::domain::transaction::{Transaction, TransactionId};
use crate::repo::transaction_document::read_document;
use crate::repo::transaction_repo::{OrderBy, TransactionCriteria, TransactionRepository};
use anyhow::{bail, Result};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

/// Transactions stored as a JSONB document, with the filterable fields
/// copied into plain columns.
#[derive(Clone)]
pub struct PgTransactionRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl TransactionRepository for PgTransactionRepo {
    async fn add(&self, tx: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                transaction_id, biller, status, previous_transaction_id, document, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(tx.id().as_uuid())
        .bind(tx.biller_name().as_str())
        .bind(tx.status().as_str())
        .bind(tx.previous_transaction_id().map(|id| id.as_uuid()))
        .bind(tx.to_document()?)
        .bind(tx.created_at())
        .bind(tx.updated_at())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, tx: &Transaction) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $2, document = $3, updated_at = $4
            WHERE transaction_id = $1
            "#,
        )
        .bind(tx.id().as_uuid())
        .bind(tx.status().as_str())
        .bind(tx.to_document()?)
        .bind(tx.updated_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("transaction {} not found", tx.id());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query("SELECT document FROM transactions WHERE transaction_id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let document: Value = row.get("document");
                Ok(Some(read_document(document)?))
            }
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
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT document FROM transactions WHERE 1=1");
        if let Some(biller) = criteria.biller {
            query.push(" AND biller = ").push_bind(biller.as_str());
        }
        if let Some(status) = criteria.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(previous) = criteria.previous_transaction_id {
            query.push(" AND previous_transaction_id = ").push_bind(previous.as_uuid());
        }
        if let Some(after) = criteria.created_after {
            query.push(" AND created_at > ").push_bind(after);
        }
        if let Some(before) = criteria.created_before {
            query.push(" AND created_at < ").push_bind(before);
        }

        query.push(match order_by.unwrap_or(OrderBy::CreatedAtAsc) {
            OrderBy::CreatedAtAsc => " ORDER BY created_at ASC, transaction_id ASC",
            OrderBy::CreatedAtDesc => " ORDER BY created_at DESC, transaction_id DESC",
        });
        if let Some(limit) = limit {
            query.push(" LIMIT ").push_bind(limit as i64);
        }
        if let Some(offset) = offset {
            query.push(" OFFSET ").push_bind(offset as i64);
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        let mut found = Vec::with_capacity(rows.len());
        for row in rows {
            let document: Value = row.get("document");
            found.push(read_document(document)?);
        }
        Ok(found)
    }
}
