use std::fmt::Display;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// The `gatewayTransactionId` recorded when the gateway omits one from its status payload.
pub const UNKNOWN_GATEWAY_TX_ID: &str = "unknown";

/// The gateway status value that triggers fulfillment, unless configured otherwise.
pub const DEFAULT_PAID_STATUS: &str = "Paid";

/// Subscriptions purchased through a notification run for this many days from the moment they are fulfilled.
pub const SUBSCRIPTION_WINDOW_DAYS: i64 = 20;

//--------------------------------------       Credits        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Credits(i64);

impl From<i64> for Credits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Credits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} credits", self.0)
    }
}

impl Credits {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

//--------------------------------------  TransactionReference  -------------------------------------------------------
/// The merchant-side reference for a transaction. It is assigned by the checkout flow and is the key of the
/// transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct TransactionReference(pub String);

impl From<String> for TransactionReference {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TransactionReference {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for TransactionReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

impl TransactionReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     Fulfillment      ---------------------------------------------------------
/// What a transaction buys once it is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fulfillment {
    /// A subscription to the given plan.
    Subscription { plan: String },
    /// A credit top-up. The amount is optional here, because the checkout flow does not always record one. A missing
    /// or non-positive amount is rejected when the fulfillment is applied.
    Credits { amount: Option<Credits> },
}

impl Fulfillment {
    pub fn kind(&self) -> FulfillmentKind {
        match self {
            Fulfillment::Subscription { .. } => FulfillmentKind::Subscription,
            Fulfillment::Credits { .. } => FulfillmentKind::Credits,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentKind {
    Subscription,
    Credits,
}

impl Display for FulfillmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentKind::Subscription => write!(f, "Subscription"),
            FulfillmentKind::Credits => write!(f, "Credits"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid fulfillment kind: {0}")]
pub struct ConversionError(String);

impl std::str::FromStr for FulfillmentKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Subscription" => Ok(Self::Subscription),
            "Credits" => Ok(Self::Credits),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

/// A fully validated fulfillment, ready to be applied to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FulfillmentEffect {
    GrantCredits(Credits),
    SetSubscription { plan: String, start: DateTime<Utc>, end: DateTime<Utc> },
}

impl Display for FulfillmentEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentEffect::GrantCredits(amount) => write!(f, "grant {amount}"),
            FulfillmentEffect::SetSubscription { plan, end, .. } => write!(f, "subscribe to {plan} until {end}"),
        }
    }
}

//--------------------------------------  TransactionRecord   ---------------------------------------------------------
/// A transaction as stored by the checkout flow and updated by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub reference: TransactionReference,
    pub status: String,
    pub gateway_transaction_id: Option<String>,
    pub user_id: Option<String>,
    pub fulfillment: Option<Fulfillment>,
    /// True once the fulfillment effect has been applied. Set in the same store transaction as the effect.
    pub fulfilled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The raw shape of a row in the `transactions` table. Converted into a [`TransactionRecord`] on read, which is where
/// the fulfillment columns are checked for consistency.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub reference: String,
    pub status: String,
    pub gateway_transaction_id: Option<String>,
    pub user_id: Option<String>,
    pub fulfillment_kind: Option<String>,
    pub plan_id: Option<String>,
    pub credits_amount: Option<i64>,
    pub fulfilled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionRow> for TransactionRecord {
    fn from(row: TransactionRow) -> Self {
        let fulfillment = match row.fulfillment_kind.as_deref().map(str::parse::<FulfillmentKind>) {
            None => None,
            Some(Ok(FulfillmentKind::Subscription)) => match row.plan_id.filter(|p| !p.is_empty()) {
                Some(plan) => Some(Fulfillment::Subscription { plan }),
                None => {
                    warn!("🗃️ Transaction [{}] is a subscription purchase without a plan id", row.reference);
                    None
                },
            },
            Some(Ok(FulfillmentKind::Credits)) => {
                Some(Fulfillment::Credits { amount: row.credits_amount.map(Credits::from) })
            },
            Some(Err(e)) => {
                warn!("🗃️ Transaction [{}] has an unusable fulfillment descriptor. {e}", row.reference);
                None
            },
        };
        Self {
            reference: TransactionReference(row.reference),
            status: row.status,
            gateway_transaction_id: row.gateway_transaction_id,
            user_id: row.user_id.filter(|u| !u.is_empty()),
            fulfillment,
            fulfilled: row.fulfilled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A transaction as created by the checkout flow. Reconciliation never creates transactions; this is here so that
/// the upstream flow (and tests) can seed the store.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub reference: TransactionReference,
    pub status: String,
    pub user_id: Option<String>,
    pub fulfillment: Option<Fulfillment>,
}

impl NewTransaction {
    pub fn new<R: Into<TransactionReference>>(reference: R, user_id: &str) -> Self {
        Self {
            reference: reference.into(),
            status: "Initiated".to_string(),
            user_id: Some(user_id.to_string()),
            fulfillment: None,
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn for_subscription(mut self, plan: &str) -> Self {
        self.fulfillment = Some(Fulfillment::Subscription { plan: plan.to_string() });
        self
    }

    pub fn for_credits(mut self, amount: i64) -> Self {
        self.fulfillment = Some(Fulfillment::Credits { amount: Some(Credits::from(amount)) });
        self
    }

    pub fn without_user(mut self) -> Self {
        self.user_id = None;
        self
    }
}

//--------------------------------------     StatusUpdate      --------------------------------------------------------
/// The unconditional overwrite applied to a transaction on every reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: String,
    pub gateway_transaction_id: String,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       Account         --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Account {
    pub user_id: String,
    pub credits: Credits,
    pub subscription_plan: Option<String>,
    pub subscription_start: Option<DateTime<Utc>>,
    pub subscription_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: String,
    pub credits: Credits,
}

impl NewAccount {
    pub fn new(user_id: &str, credits: i64) -> Self {
        Self { user_id: user_id.to_string(), credits: Credits::from(credits) }
    }
}

//--------------------------------------     GatewayStatus     --------------------------------------------------------
/// The authoritative status of a transaction, as reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStatus {
    pub status: String,
    pub gateway_transaction_id: String,
}

impl GatewayStatus {
    /// Builds a status payload. A missing (or blank) gateway transaction id is replaced with
    /// [`UNKNOWN_GATEWAY_TX_ID`].
    pub fn new<S: Into<String>>(status: S, gateway_transaction_id: Option<String>) -> Self {
        let gateway_transaction_id = gateway_transaction_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_GATEWAY_TX_ID.to_string());
        Self { status: status.into(), gateway_transaction_id }
    }
}

//-------------------------------------- NotificationTarget   ---------------------------------------------------------
/// The identifiers carried in the trailing path segments of a notification's status-check URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub merchant_id: String,
    pub store_id: String,
    pub reference: TransactionReference,
}
