use crate::billers::{
    supported_operations, translator_for, BillerCallError, BillerClient, BillerCommand, CardUploadCommand,
    ChargeCommand, LookupThreeDsTwoCommand, NewSaleCommand, PostbackCommand, RebillUpdateCommand,
    ResponseTranslator, ThreeDCompletionCommand,
};
use crate::circuit::{CircuitBreaker, CommandKey};
use crate::domain::biller_response::{BillerResponse, ResponseResult};
use crate::domain::biller_settings::BillerName;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Every operation a biller can be asked to perform. Each call returns a
/// complete `BillerResponse`; transport trouble comes back as `Aborted`.
/// Nothing here retries.
#[derive(Clone)]
pub struct BillerAdapter {
    client: Arc<dyn BillerClient>,
    translator: Arc<dyn ResponseTranslator>,
    breaker: CircuitBreaker,
}

impl BillerAdapter {
    pub fn new(client: Arc<dyn BillerClient>, breaker: CircuitBreaker) -> Self {
        let translator: Arc<dyn ResponseTranslator> = Arc::from(translator_for(client.biller()));
        Self {
            client,
            translator,
            breaker,
        }
    }

    pub fn biller(&self) -> BillerName {
        self.client.biller()
    }

    pub async fn charge(&self, command: ChargeCommand) -> BillerResponse {
        self.invoke(BillerCommand::Charge(command)).await
    }

    pub async fn complete_three_d(&self, command: ThreeDCompletionCommand) -> BillerResponse {
        self.invoke(BillerCommand::CompleteThreeD(command)).await
    }

    pub async fn simplified_complete_three_d(&self, command: ThreeDCompletionCommand) -> BillerResponse {
        self.invoke(BillerCommand::SimplifiedCompleteThreeD(command)).await
    }

    pub async fn lookup_three_ds_two(&self, command: LookupThreeDsTwoCommand) -> BillerResponse {
        self.invoke(BillerCommand::LookupThreeDsTwo(command)).await
    }

    /// Start, stop, update or suspend, as carried by the command.
    pub async fn rebill_update(&self, command: RebillUpdateCommand) -> BillerResponse {
        self.invoke(BillerCommand::RebillUpdate(command)).await
    }

    pub async fn card_upload(&self, command: CardUploadCommand) -> BillerResponse {
        self.invoke(BillerCommand::CardUpload(command)).await
    }

    pub async fn new_sale(&self, command: NewSaleCommand) -> BillerResponse {
        self.invoke(BillerCommand::NewSale(command)).await
    }

    pub async fn postback_translate(&self, command: PostbackCommand) -> BillerResponse {
        self.invoke(BillerCommand::PostbackTranslate(command)).await
    }

    pub async fn invoke(&self, command: BillerCommand) -> BillerResponse {
        let biller = self.biller();
        let operation = command.operation();
        let request_date = Utc::now();

        if !supported_operations(biller).contains(&operation) {
            let error = BillerCallError::Unsupported { biller, operation };
            return fallback_response(biller, &command, &error, request_date);
        }

        let client = &self.client;
        let translator = &self.translator;
        let command_ref = &command;
        self.breaker
            .execute(
                CommandKey::new(biller, operation),
                move || async move {
                    let exchange = client.send(command_ref).await?;
                    let response_date = Utc::now();
                    Ok(translator.translate(operation, &exchange, request_date, response_date)?)
                },
                |error| fallback_response(biller, command_ref, &error, request_date),
            )
            .await
    }
}

/// Aborted response standing in for a call that never produced a usable
/// answer. The request is kept so the audit log shows what was attempted.
fn fallback_response(
    biller: BillerName,
    command: &BillerCommand,
    error: &BillerCallError,
    request_date: DateTime<Utc>,
) -> BillerResponse {
    warn!(
        biller = %biller,
        operation = %command.operation(),
        transaction_id = %command.transaction_id(),
        error = %error,
        "biller call did not complete, returning aborted response"
    );

    let mut response = BillerResponse::new(ResponseResult::Aborted, request_date, Utc::now());
    response.reason = Some(error.to_string());
    response.request_payload = match command.to_payload() {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!(transaction_id = %command.transaction_id(), error = %e, "request left out of the audit log");
            None
        }
    };
    response.response_payload = Some(json!({ "error": error.to_string() }).to_string());
    response
}
