use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use ipn_engine::{IpnError, MalformedReason};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Requests from this address are not accepted")]
    ForbiddenPeer,
    #[error("{0}")]
    NotificationError(#[from] IpnError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotificationError(e) => match e {
                IpnError::MalformedNotification(_) => StatusCode::BAD_REQUEST,
                IpnError::MerchantMismatch { .. } => StatusCode::BAD_REQUEST,
                IpnError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
                IpnError::IncompleteTransaction { .. } => StatusCode::BAD_REQUEST,
                IpnError::InvalidCreditsAmount { .. } => StatusCode::BAD_REQUEST,
                IpnError::GatewayUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
                IpnError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::ForbiddenPeer => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The gateway only looks at the status code. The plain-text bodies are kept short, and never leak internals.
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::NotificationError(e) => match e {
                IpnError::MalformedNotification(MalformedReason::MissingUrl) => "Missing `url` parameter",
                IpnError::MalformedNotification(_) => "Invalid URL format",
                IpnError::MerchantMismatch { .. } => "Invalid Merchant or Store ID",
                IpnError::TransactionNotFound(_) => "Transaction not found",
                IpnError::IncompleteTransaction { .. } => "Incomplete transaction",
                IpnError::InvalidCreditsAmount { .. } => "Invalid credits amount",
                IpnError::GatewayUnavailable(_) | IpnError::StoreUnavailable(_) => "Internal Server Error",
            },
            Self::ForbiddenPeer => "Forbidden",
            _ => "Internal Server Error",
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::plaintext()).body(body)
    }
}
