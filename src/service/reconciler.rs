use crate::domain::biller_response::{BillerResponse, ResponseResult};
use crate::domain::biller_settings::BillerName;
use crate::domain::error::DomainError;
use crate::domain::error_classification::ClassificationKey;
use crate::domain::status::Status;
use crate::domain::transaction::Transaction;
use crate::obfuscation::Obfuscator;
use crate::repo::error_classification_repo::ErrorClassificationLookup;
use std::sync::Arc;
use tracing::{debug, warn};

/// Folds a biller response into a transaction, then attaches a decline
/// classification when one is known.
#[derive(Clone)]
pub struct TransactionReconciler {
    classifier: Arc<dyn ErrorClassificationLookup>,
    obfuscator: Arc<Obfuscator>,
}

impl TransactionReconciler {
    pub fn new(classifier: Arc<dyn ErrorClassificationLookup>, obfuscator: Arc<Obfuscator>) -> Self {
        Self { classifier, obfuscator }
    }

    pub fn obfuscator(&self) -> &Obfuscator {
        &self.obfuscator
    }

    pub async fn apply(&self, tx: &mut Transaction, response: &BillerResponse) -> Result<Status, DomainError> {
        let status = tx.apply_response(response, &self.obfuscator)?;

        if matches!(response.result, ResponseResult::Declined | ResponseResult::Aborted) {
            if let Some(key) = classification_key(tx.biller_name(), response) {
                match self.classifier.classify(tx.biller_name(), &key).await {
                    Ok(Some(classification)) => tx.record_error_classification(classification),
                    Ok(None) => debug!(
                        transaction_id = %tx.id(),
                        discriminant = %key.discriminant(),
                        "no error classification"
                    ),
                    Err(e) => warn!(
                        transaction_id = %tx.id(),
                        error = %e,
                        "error classification lookup failed"
                    ),
                }
            }
        }

        Ok(status)
    }
}

/// Netbilling reports free-text declines per processor; everyone else has
/// a response code.
pub fn classification_key(biller: BillerName, response: &BillerResponse) -> Option<ClassificationKey> {
    if biller == BillerName::Netbilling {
        if let (Some(processor), Some(message)) = (&response.processor, &response.reason) {
            return Some(ClassificationKey::ProcessorMessage {
                processor: processor.clone(),
                message: message.clone(),
            });
        }
    }
    response.code.clone().map(ClassificationKey::Code)
}
