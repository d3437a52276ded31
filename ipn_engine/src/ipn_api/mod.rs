//! # IPN engine public API
//!
//! * [`reconciliation_api`] takes a fetched gateway status for a known transaction reference and brings the store in
//!   line with it, applying the fulfillment effect exactly once when the transaction becomes paid.
//! * [`notification_flow_api`] is the entry point for an inbound notification. It parses and validates the
//!   notification, fetches the authoritative status from the gateway and hands it to the reconciliation API.
//!
//! Both APIs are generic over their backends, so that the hosting process decides which store and gateway client to
//! inject:
//!
//! ```rust,ignore
//! use ipn_engine::{MerchantIdentity, NotificationFlowApi, ReconciliationApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let reconciler = ReconciliationApi::new(db, "Paid");
//! let api = NotificationFlowApi::new(reconciler, gateway_client, MerchantIdentity::new("M1", "S1"), timeout);
//! let outcome = api.process_notification(Some(status_url)).await?;
//! ```
pub mod errors;
pub mod notification_flow_api;
pub mod reconciliation_api;
