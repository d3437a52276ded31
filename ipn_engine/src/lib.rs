//! IPN Engine
//!
//! The IPN engine reconciles Instant Payment Notifications from a payment gateway against the transactions recorded by
//! a merchant's checkout flow. It is transport-agnostic: the HTTP surface lives in `ipn_server`.
//!
//! A notification carries nothing but a status-check URL. The engine
//! 1. extracts the merchant id, store id and transaction reference from the trailing segments of that URL,
//! 2. rejects the notification unless the merchant and store match the configured identity,
//! 3. fetches the authoritative status from the gateway, and
//! 4. overwrites the stored status with it, applying the transaction's fulfillment (a credit top-up or a subscription)
//!    exactly once when the status becomes "paid".
//!
//! The store and the gateway client are injected through the traits in [`mod@traits`]. [`SqliteDatabase`] is the
//! bundled store implementation.
pub mod db_types;
pub mod helpers;
pub mod ipn_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use helpers::{parse_status_url, MerchantIdentity};
pub use ipn_api::{
    errors::{IpnError, MalformedReason},
    notification_flow_api::NotificationFlowApi,
    reconciliation_api::{ReconciliationApi, ReconciliationOutcome},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{FulfillmentResult, StatusFetchError, StatusFetcher, TransactionStore, TransactionStoreError};
