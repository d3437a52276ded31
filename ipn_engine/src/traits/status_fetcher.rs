use thiserror::Error;
use url::Url;

use crate::db_types::GatewayStatus;

#[derive(Debug, Clone, Error)]
pub enum StatusFetchError {
    #[error("The status request timed out after {0} ms")]
    Timeout(u128),
    #[error("Could not reach the gateway. {0}")]
    Transport(String),
    #[error("The gateway responded with HTTP {status}. {message}")]
    HttpStatus { status: u16, message: String },
    #[error("The gateway response could not be understood. {0}")]
    InvalidPayload(String),
}

/// Retrieves the authoritative status of a transaction from the payment gateway.
#[allow(async_fn_in_trait)]
pub trait StatusFetcher {
    /// Issues the status request for the given status-check URL and decodes the gateway's answer.
    async fn fetch_status(&self, status_url: &Url) -> Result<GatewayStatus, StatusFetchError>;
}
