use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Fulfillment, NewTransaction, StatusUpdate, TransactionRecord, TransactionReference, TransactionRow},
    traits::TransactionStoreError,
};

/// Inserts a new transaction, as the checkout flow would. The reconciliation engine never calls this.
pub async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<TransactionRecord, TransactionStoreError> {
    let kind = transaction.fulfillment.as_ref().map(|f| f.kind().to_string());
    let (plan_id, credits_amount) = match &transaction.fulfillment {
        Some(Fulfillment::Subscription { plan }) => (Some(plan.clone()), None),
        Some(Fulfillment::Credits { amount }) => (None, amount.map(|a| a.value())),
        None => (None, None),
    };
    let now = Utc::now();
    let row: TransactionRow = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                reference,
                status,
                user_id,
                fulfillment_kind,
                plan_id,
                credits_amount,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *;
        "#,
    )
    .bind(transaction.reference.as_str())
    .bind(transaction.status)
    .bind(transaction.user_id)
    .bind(kind)
    .bind(plan_id)
    .bind(credits_amount)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(row.into())
}

pub async fn fetch_transaction(
    reference: &TransactionReference,
    conn: &mut SqliteConnection,
) -> Result<Option<TransactionRecord>, TransactionStoreError> {
    let row: Option<TransactionRow> = sqlx::query_as("SELECT * FROM transactions WHERE reference = $1")
        .bind(reference.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(row.map(TransactionRecord::from))
}

/// Overwrites the reconciliation fields of a transaction, regardless of their current values.
pub async fn update_status(
    reference: &TransactionReference,
    update: &StatusUpdate,
    conn: &mut SqliteConnection,
) -> Result<TransactionRecord, TransactionStoreError> {
    let row: TransactionRow = sqlx::query_as(
        r#"
            UPDATE transactions
            SET status = $1, gateway_transaction_id = $2, updated_at = $3
            WHERE reference = $4
            RETURNING *;
        "#,
    )
    .bind(&update.status)
    .bind(&update.gateway_transaction_id)
    .bind(update.updated_at)
    .bind(reference.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| TransactionStoreError::TransactionNotFound(reference.clone()))?;
    trace!("🗃️ Transaction {reference} now has status {}", row.status);
    Ok(row.into())
}

/// Sets the `fulfilled` flag, but only if it is currently clear. Returns `true` if this call set the flag, and `false`
/// if the transaction had already been fulfilled (or does not exist).
///
/// Call this inside the same database transaction as the fulfillment effect.
pub async fn claim_fulfillment(
    reference: &TransactionReference,
    timestamp: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, TransactionStoreError> {
    let result = sqlx::query("UPDATE transactions SET fulfilled = 1, fulfilled_at = $1 WHERE reference = $2 AND fulfilled = 0")
        .bind(timestamp)
        .bind(reference.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}
