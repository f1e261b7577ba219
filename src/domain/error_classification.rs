use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassification {
    pub group_decline: String,
    pub error_type: String,
    pub group_message: String,
    pub recommended_action: String,
}

/// What the classification service is asked about. Most billers classify
/// by their own response code; Netbilling only exposes a processor name and
/// a free-text message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassificationKey {
    Code(String),
    ProcessorMessage { processor: String, message: String },
}

impl ClassificationKey {
    pub fn discriminant(&self) -> String {
        match self {
            ClassificationKey::Code(code) => code.clone(),
            ClassificationKey::ProcessorMessage { processor, message } => {
                format!("{}:{}", processor.to_lowercase(), message.to_lowercase())
            }
        }
    }
}
