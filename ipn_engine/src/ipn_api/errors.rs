use thiserror::Error;

use crate::{
    db_types::TransactionReference,
    traits::{StatusFetchError, TransactionStoreError},
};

/// Why a notification could not be turned into a merchant id, store id and transaction reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("the notification did not carry a status URL")]
    MissingUrl,
    #[error("the status URL could not be parsed. {0}")]
    UnparseableUrl(String),
    #[error("the status URL has {0} path segments, but at least 3 are required")]
    TooFewSegments(usize),
    #[error("the merchant id, store id or transaction reference in the status URL is empty")]
    EmptySegment,
}

/// Every way a notification can fail.
///
/// The first five variants are client errors: redelivering the same notification will fail the same way. The last
/// two are infrastructure failures, which are safe for the gateway to redeliver.
#[derive(Debug, Clone, Error)]
pub enum IpnError {
    #[error("Malformed notification: {0}")]
    MalformedNotification(#[from] MalformedReason),
    #[error("Notification is for merchant '{merchant_id}' and store '{store_id}', which does not match our configuration")]
    MerchantMismatch { merchant_id: String, store_id: String },
    #[error("Transaction {0} does not exist")]
    TransactionNotFound(TransactionReference),
    #[error("Transaction {reference} cannot be fulfilled. {reason}")]
    IncompleteTransaction { reference: TransactionReference, reason: String },
    #[error("Transaction {reference} has an invalid credits amount: {amount}")]
    InvalidCreditsAmount { reference: TransactionReference, amount: String },
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(String),
    #[error("The transaction store is unavailable. {0}")]
    StoreUnavailable(String),
}

impl IpnError {
    /// True for failures that a redelivery of the same notification could succeed on.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::GatewayUnavailable(_) | Self::StoreUnavailable(_))
    }
}

impl From<TransactionStoreError> for IpnError {
    fn from(e: TransactionStoreError) -> Self {
        match e {
            TransactionStoreError::TransactionNotFound(reference) => Self::TransactionNotFound(reference),
            TransactionStoreError::AccountNotFound { reference, user_id } => {
                Self::IncompleteTransaction { reference, reason: format!("Account {user_id} does not exist") }
            },
            TransactionStoreError::DatabaseError(e) => Self::StoreUnavailable(e),
        }
    }
}

impl From<StatusFetchError> for IpnError {
    fn from(e: StatusFetchError) -> Self {
        Self::GatewayUnavailable(e.to_string())
    }
}
