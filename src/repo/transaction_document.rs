use crate::domain::error::DomainError;
use crate::domain::status::Status;
use crate::domain::transaction::Transaction;
use serde_json::{json, Map, Value};

/// Brings a stored document written by an older version of the service up to
/// the current shape, then rebuilds the aggregate from it.
pub fn read_document(document: Value) -> Result<Transaction, DomainError> {
    Transaction::from_document(upgrade(document)?)
}

pub fn upgrade(document: Value) -> Result<Value, DomainError> {
    let mut doc = match document {
        Value::Object(map) => map,
        other => {
            return Err(DomainError::MalformedDocument(format!(
                "expected an object, got {}",
                other
            )))
        }
    };

    rename(&mut doc, "transaction_id", "id");
    rename(&mut doc, "billerInteractions", "biller_interactions");
    rename(&mut doc, "previousTransactionId", "previous_transaction_id");

    normalize_status(&mut doc)?;
    normalize_kind(&mut doc);

    if !doc.contains_key("biller_name") {
        if let Some(biller) = doc
            .get("biller_settings")
            .and_then(|s| s.get("biller"))
            .cloned()
        {
            doc.insert("biller_name".to_string(), biller);
        }
    }

    if !doc.contains_key("biller_interactions") || doc["biller_interactions"].is_null() {
        doc.insert("biller_interactions".to_string(), json!([]));
    }

    if !doc.contains_key("three_ds") {
        let three_ds = json!({
            "version": take(&mut doc, "threeds_version").filter(|v| !v.is_null()),
            "with_3d": take(&mut doc, "with_3d").unwrap_or(Value::Bool(false)),
            "required_to_use_3d": take(&mut doc, "required_to_use_3d").unwrap_or(Value::Bool(false)),
            "auth_required": false,
            "init_required": false,
            "sca_required": false,
            "return_url": take(&mut doc, "return_url"),
        });
        doc.insert("three_ds".to_string(), three_ds);
    }

    for key in [
        "payment_method",
        "previous_transaction_id",
        "error_classification",
        "response_code",
        "response_reason",
        "biller_transaction_id",
        "subsequent_operation_fields",
        "charge_information",
        "payment_information",
    ] {
        doc.entry(key.to_string()).or_insert(Value::Null);
    }

    if !doc.contains_key("updated_at") {
        if let Some(created) = doc.get("created_at").cloned() {
            doc.insert("updated_at".to_string(), created);
        }
    }

    Ok(Value::Object(doc))
}

fn normalize_status(doc: &mut Map<String, Value>) -> Result<(), DomainError> {
    let raw = match doc.get("status") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(o)) => o
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| DomainError::MalformedDocument("status object has no name".to_string()))?,
        _ => return Err(DomainError::MalformedDocument("status is missing".to_string())),
    };
    let status = Status::parse(&raw)
        .ok_or_else(|| DomainError::MalformedDocument(format!("unknown status '{}'", raw)))?;
    doc.insert("status".to_string(), Value::String(status.as_str().to_string()));
    Ok(())
}

fn normalize_kind(doc: &mut Map<String, Value>) {
    if doc.get("kind").is_some_and(|k| k.is_object()) {
        return;
    }
    let legacy = take(doc, "kind").or_else(|| take(doc, "type"));
    let kind = match legacy.as_ref().and_then(|v| v.as_str()) {
        Some("RebillUpdateTransaction") | Some("rebill_update") => {
            let operation = take(doc, "rebill_operation").unwrap_or(Value::String("update".to_string()));
            json!({ "type": "rebill_update", "operation": operation })
        }
        _ => json!({ "type": "charge" }),
    };
    doc.insert("kind".to_string(), kind);
}

fn rename(doc: &mut Map<String, Value>, from: &str, to: &str) {
    if !doc.contains_key(to) {
        if let Some(value) = doc.remove(from) {
            doc.insert(to.to_string(), value);
        }
    }
}

fn take(doc: &mut Map<String, Value>, key: &str) -> Option<Value> {
    doc.remove(key)
}
