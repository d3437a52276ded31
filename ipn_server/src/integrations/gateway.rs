//! Client for the payment gateway's transaction status endpoint.
//!
//! The status-check URL carried by a notification is fetched with a plain `GET`. The gateway answers with a JSON
//! object of the form
//!
//! ```json
//! { "TransactionStatus": "Paid", "TransactionId": "GW-123456" }
//! ```
//!
//! `TransactionId` may be absent, and some gateways send it as a number.
use std::{sync::Arc, time::Duration};

use ipn_engine::{
    db_types::GatewayStatus,
    traits::{StatusFetchError, StatusFetcher},
};
use log::*;
use reqwest::{
    header::{HeaderValue, ACCEPT},
    Client,
};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::errors::ServerError;

#[derive(Clone)]
pub struct GatewayClient {
    client: Arc<Client>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatusPayload {
    transaction_status: Option<String>,
    transaction_id: Option<Value>,
}

impl GatewayClient {
    pub fn new(timeout: Duration) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::InitializeError(format!("Could not create the gateway client. {e}")))?;
        Ok(Self { client: Arc::new(client), timeout })
    }
}

impl StatusFetcher for GatewayClient {
    async fn fetch_status(&self, status_url: &Url) -> Result<GatewayStatus, StatusFetchError> {
        trace!("🌐️ Fetching transaction status from {status_url}");
        let response = self
            .client
            .get(status_url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StatusFetchError::Timeout(self.timeout.as_millis())
                } else {
                    StatusFetchError::Transport(e.to_string())
                }
            })?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("🌐️ Gateway returned {status} for {status_url}");
            return Err(StatusFetchError::HttpStatus { status: status.as_u16(), message });
        }
        let body = response.text().await.map_err(|e| StatusFetchError::Transport(e.to_string()))?;
        debug!("🌐️ Gateway status payload: {body}");
        decode_status(&body)
    }
}

/// Decodes the gateway's status payload. A missing `TransactionId` becomes the "unknown" sentinel; a missing
/// `TransactionStatus` is an error.
pub fn decode_status(body: &str) -> Result<GatewayStatus, StatusFetchError> {
    if body.trim().is_empty() {
        return Err(StatusFetchError::InvalidPayload("Empty response from the transaction status URL".into()));
    }
    let payload =
        serde_json::from_str::<StatusPayload>(body).map_err(|e| StatusFetchError::InvalidPayload(e.to_string()))?;
    let status = payload
        .transaction_status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StatusFetchError::InvalidPayload("TransactionStatus is missing".into()))?;
    let gateway_transaction_id = match payload.transaction_id {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null) | None => None,
        Some(v) => {
            warn!("🌐️ Ignoring TransactionId of unexpected type: {v}");
            None
        },
    };
    Ok(GatewayStatus::new(status, gateway_transaction_id))
}
