//! `SqliteDatabase` is the SQLite-backed [`TransactionStore`] for the reconciliation engine.
use std::{fmt::Debug, str::FromStr};

use chrono::Utc;
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, sqlite::SqliteConnectOptions, Sqlite, SqlitePool};

use super::db::{accounts, db_url, new_pool, transactions};
use crate::{
    db_types::{
        Account,
        FulfillmentEffect,
        NewAccount,
        NewTransaction,
        StatusUpdate,
        TransactionRecord,
        TransactionReference,
    },
    traits::{FulfillmentResult, TransactionStore, TransactionStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl TransactionStore for SqliteDatabase {
    async fn fetch_transaction(
        &self,
        reference: &TransactionReference,
    ) -> Result<Option<TransactionRecord>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_transaction(reference, &mut conn).await
    }

    async fn update_transaction_status(
        &self,
        reference: &TransactionReference,
        update: &StatusUpdate,
    ) -> Result<TransactionRecord, TransactionStoreError> {
        let mut tx = self.pool.begin().await?;
        let record = transactions::update_status(reference, update, &mut tx).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Claims the transaction and applies the effect in one database transaction. Dropping `tx` without committing
    /// rolls back the claim, so a missing account leaves the transaction unfulfilled.
    async fn apply_fulfillment(
        &self,
        reference: &TransactionReference,
        user_id: &str,
        effect: &FulfillmentEffect,
    ) -> Result<FulfillmentResult, TransactionStoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        if !transactions::claim_fulfillment(reference, now, &mut tx).await? {
            debug!("🗃️ Transaction {reference} has already been fulfilled. Leaving account {user_id} alone.");
            return Ok(FulfillmentResult::AlreadyFulfilled);
        }
        let account = match effect {
            FulfillmentEffect::GrantCredits(amount) => {
                accounts::increment_credits(user_id, *amount, now, &mut tx).await?
            },
            FulfillmentEffect::SetSubscription { plan, start, end } => {
                accounts::set_subscription(user_id, plan, *start, *end, &mut tx).await?
            },
        };
        let Some(account) = account else {
            warn!("🗃️ Account {user_id} does not exist. Rolling back fulfillment of {reference}");
            return Err(TransactionStoreError::AccountNotFound {
                reference: reference.clone(),
                user_id: user_id.to_string(),
            });
        };
        tx.commit().await?;
        debug!("🗃️ Fulfillment of {reference} committed: {effect} for {user_id}");
        Ok(FulfillmentResult::Applied(account))
    }

    async fn fetch_account(&self, user_id: &str) -> Result<Option<Account>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        accounts::fetch_account(user_id, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `IPN_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Creates the SQLite database file, and its directory, if they do not exist yet. Call this before connecting.
    pub async fn create_if_missing(url: &str) -> Result<(), sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?;
        if let Some(dir) = options.get_filename().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        if !Sqlite::database_exists(url).await? {
            Sqlite::create_database(url).await?;
            info!("🗃️ Created Sqlite database {url}");
        }
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    /// Stores a new transaction. Reconciliation never does this; the checkout flow (and the test suite) does.
    pub async fn insert_transaction(&self, transaction: NewTransaction) -> Result<TransactionRecord, TransactionStoreError> {
        let mut tx = self.pool.begin().await?;
        let record = transactions::insert_transaction(transaction, &mut tx).await?;
        tx.commit().await?;
        Ok(record)
    }

    pub async fn insert_account(&self, account: NewAccount) -> Result<Account, TransactionStoreError> {
        let mut tx = self.pool.begin().await?;
        let account = accounts::insert_account(account, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }
}
