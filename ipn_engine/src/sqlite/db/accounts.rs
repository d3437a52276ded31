use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Account, Credits, NewAccount},
    traits::TransactionStoreError,
};

pub async fn insert_account(account: NewAccount, conn: &mut SqliteConnection) -> Result<Account, TransactionStoreError> {
    let now = Utc::now();
    let account = sqlx::query_as(
        r#"
            INSERT INTO accounts (user_id, credits, created_at, updated_at) VALUES ($1, $2, $3, $3)
            RETURNING *;
        "#,
    )
    .bind(account.user_id)
    .bind(account.credits)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(account)
}

pub async fn fetch_account(user_id: &str, conn: &mut SqliteConnection) -> Result<Option<Account>, TransactionStoreError> {
    let account = sqlx::query_as("SELECT * FROM accounts WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(account)
}

/// Adds `amount` to the stored balance in a single statement. The increment is computed by the database against the
/// current row, never against a balance read earlier.
///
/// Returns `None` if the account does not exist.
pub async fn increment_credits(
    user_id: &str,
    amount: Credits,
    timestamp: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Account>, TransactionStoreError> {
    let account = sqlx::query_as(
        "UPDATE accounts SET credits = credits + $1, updated_at = $2 WHERE user_id = $3 RETURNING *",
    )
    .bind(amount)
    .bind(timestamp)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(account)
}

/// Replaces the subscription on the account. Subscriptions do not stack: the last write wins.
///
/// Returns `None` if the account does not exist.
pub async fn set_subscription(
    user_id: &str,
    plan: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Account>, TransactionStoreError> {
    let account = sqlx::query_as(
        r#"
            UPDATE accounts
            SET subscription_plan = $1, subscription_start = $2, subscription_end = $3, updated_at = $2
            WHERE user_id = $4
            RETURNING *;
        "#,
    )
    .bind(plan)
    .bind(start)
    .bind(end)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(account)
}
