//! # Backend contracts
//!
//! The reconciliation engine does not talk to a database or to the payment gateway directly. It goes through the two
//! traits defined here, and the hosting process decides which implementations to inject.
//!
//! * [`TransactionStore`] holds transaction records and user accounts. It must offer a point lookup, an overwrite
//!   update, and an atomic "claim and apply" for fulfillment.
//! * [`StatusFetcher`] retrieves the authoritative status of a transaction from the payment gateway.
mod data_objects;
mod status_fetcher;
mod transaction_store;

pub use data_objects::FulfillmentResult;
pub use status_fetcher::{StatusFetchError, StatusFetcher};
pub use transaction_store::{TransactionStore, TransactionStoreError};
