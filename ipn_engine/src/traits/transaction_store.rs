use thiserror::Error;

use crate::{
    db_types::{Account, FulfillmentEffect, StatusUpdate, TransactionRecord, TransactionReference},
    traits::FulfillmentResult,
};

#[derive(Debug, Clone, Error)]
pub enum TransactionStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Transaction {0} does not exist")]
    TransactionNotFound(TransactionReference),
    #[error("Account {user_id}, referenced by transaction {reference}, does not exist")]
    AccountNotFound { reference: TransactionReference, user_id: String },
}

impl From<sqlx::Error> for TransactionStoreError {
    fn from(e: sqlx::Error) -> Self {
        TransactionStoreError::DatabaseError(e.to_string())
    }
}

/// The behaviour a backend needs to expose to act as the transaction store for the reconciliation engine.
///
/// Transactions are created by the checkout flow, outside of this trait. Implementations must never create a
/// transaction record in response to any of these calls.
#[allow(async_fn_in_trait)]
pub trait TransactionStore {
    /// Fetches the transaction with the given reference. If it does not exist, `None` is returned.
    async fn fetch_transaction(
        &self,
        reference: &TransactionReference,
    ) -> Result<Option<TransactionRecord>, TransactionStoreError>;

    /// Overwrites the status, gateway transaction id and update time of a transaction, whatever its current status.
    ///
    /// Returns the updated record, or [`TransactionStoreError::TransactionNotFound`] if there is nothing to update.
    async fn update_transaction_status(
        &self,
        reference: &TransactionReference,
        update: &StatusUpdate,
    ) -> Result<TransactionRecord, TransactionStoreError>;

    /// In a single atomic transaction,
    /// * marks the transaction as fulfilled, if (and only if) it was not fulfilled yet,
    /// * applies the effect to the account of `user_id`.
    ///
    /// If the transaction was already fulfilled, nothing changes and [`FulfillmentResult::AlreadyFulfilled`] is
    /// returned. If the account does not exist, the whole change is rolled back and
    /// [`TransactionStoreError::AccountNotFound`] is returned.
    ///
    /// Credit grants must increment the balance as stored at the time of the write, so that concurrent grants to the
    /// same account are never lost.
    async fn apply_fulfillment(
        &self,
        reference: &TransactionReference,
        user_id: &str,
        effect: &FulfillmentEffect,
    ) -> Result<FulfillmentResult, TransactionStoreError>;

    /// Fetches the account for the given user id. If no account exists, `None` is returned.
    async fn fetch_account(&self, user_id: &str) -> Result<Option<Account>, TransactionStoreError>;
}
