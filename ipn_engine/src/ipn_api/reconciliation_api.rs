use std::fmt::{Debug, Display};

use chrono::{DateTime, Duration, Utc};
use log::*;

use crate::{
    db_types::{
        Fulfillment,
        FulfillmentEffect,
        GatewayStatus,
        StatusUpdate,
        TransactionRecord,
        TransactionReference,
        SUBSCRIPTION_WINDOW_DAYS,
    },
    ipn_api::errors::IpnError,
    traits::{FulfillmentResult, TransactionStore},
};

/// What a successful reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// The status was recorded. It is not the paid status, so nothing else happened.
    NotPaid { status: String },
    /// The status was recorded and the transaction's fulfillment effect was applied.
    Fulfilled(FulfillmentEffect),
    /// The status was recorded. The transaction had been fulfilled before, so the account was left alone.
    AlreadyFulfilled,
}

impl Display for ReconciliationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconciliationOutcome::NotPaid { status } => write!(f, "status is now {status}"),
            ReconciliationOutcome::Fulfilled(effect) => write!(f, "paid and fulfilled ({effect})"),
            ReconciliationOutcome::AlreadyFulfilled => write!(f, "paid, and was already fulfilled"),
        }
    }
}

/// `ReconciliationApi` brings a stored transaction in line with the status reported by the payment gateway.
pub struct ReconciliationApi<B> {
    db: B,
    paid_status: String,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi (paid status: {})", self.paid_status)
    }
}

impl<B> ReconciliationApi<B> {
    /// `paid_status` is the gateway status value that triggers fulfillment. It is compared exactly.
    pub fn new<S: Into<String>>(db: B, paid_status: S) -> Self {
        Self { db, paid_status: paid_status.into() }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn paid_status(&self) -> &str {
        self.paid_status.as_str()
    }
}

impl<B> ReconciliationApi<B>
where B: TransactionStore
{
    /// Reconciles the transaction `reference` against the status fetched from the gateway.
    ///
    /// 1. The transaction must already exist. If it does not, [`IpnError::TransactionNotFound`] is returned and nothing
    ///    is written.
    /// 2. The status, gateway transaction id and update time are overwritten, whatever the stored status was.
    /// 3. If the fetched status is the paid status, the fulfillment recorded on the transaction (before the update) is
    ///    applied to the user's account. The store guarantees this happens at most once per transaction.
    ///
    /// Errors from step 3 are returned after the status update has been committed.
    pub async fn reconcile(
        &self,
        reference: &TransactionReference,
        status: &GatewayStatus,
    ) -> Result<ReconciliationOutcome, IpnError> {
        let record = self.db.fetch_transaction(reference).await?.ok_or_else(|| {
            debug!("🧾️ No transaction {reference} in the store. Nothing to reconcile.");
            IpnError::TransactionNotFound(reference.clone())
        })?;
        let update = StatusUpdate {
            status: status.status.clone(),
            gateway_transaction_id: status.gateway_transaction_id.clone(),
            updated_at: Utc::now(),
        };
        self.db.update_transaction_status(reference, &update).await?;
        debug!(
            "🧾️ Transaction {reference} status {} -> {} (gateway id {})",
            record.status, update.status, update.gateway_transaction_id
        );
        if status.status != self.paid_status {
            return Ok(ReconciliationOutcome::NotPaid { status: status.status.clone() });
        }
        if record.fulfilled {
            debug!("🧾️ Transaction {reference} was fulfilled by an earlier notification");
            return Ok(ReconciliationOutcome::AlreadyFulfilled);
        }
        let (user_id, effect) = fulfillment_effect(&record, Utc::now()).map_err(|e| {
            warn!("🧾️ Transaction {reference} is paid, but cannot be fulfilled. Operator follow-up needed. {e}");
            e
        })?;
        let result = self.db.apply_fulfillment(reference, &user_id, &effect).await.map_err(|e| {
            let e = IpnError::from(e);
            if e.is_retryable() {
                error!("🧾️ Could not fulfill transaction {reference}. {e}");
            } else {
                warn!("🧾️ Could not fulfill transaction {reference}. Operator follow-up needed. {e}");
            }
            e
        })?;
        match result {
            FulfillmentResult::Applied(account) => {
                info!("🧾️ Transaction {reference} fulfilled for {}: {effect}", account.user_id);
                Ok(ReconciliationOutcome::Fulfilled(effect))
            },
            FulfillmentResult::AlreadyFulfilled => {
                debug!("🧾️ Transaction {reference} was claimed by a concurrent notification");
                Ok(ReconciliationOutcome::AlreadyFulfilled)
            },
        }
    }
}

/// Works out the user and the effect to apply for a paid transaction, from the record as it was before this
/// reconciliation.
pub fn fulfillment_effect(
    record: &TransactionRecord,
    now: DateTime<Utc>,
) -> Result<(String, FulfillmentEffect), IpnError> {
    let reference = &record.reference;
    let user_id = record.user_id.clone().ok_or_else(|| IpnError::IncompleteTransaction {
        reference: reference.clone(),
        reason: "No user id is recorded on the transaction".into(),
    })?;
    let fulfillment = record.fulfillment.as_ref().ok_or_else(|| IpnError::IncompleteTransaction {
        reference: reference.clone(),
        reason: "No fulfillment is recorded on the transaction".into(),
    })?;
    let effect = match fulfillment {
        Fulfillment::Subscription { plan } => FulfillmentEffect::SetSubscription {
            plan: plan.clone(),
            start: now,
            end: now + Duration::days(SUBSCRIPTION_WINDOW_DAYS),
        },
        Fulfillment::Credits { amount: Some(amount) } if amount.is_positive() => FulfillmentEffect::GrantCredits(*amount),
        Fulfillment::Credits { amount } => {
            let amount = amount.map(|a| a.value().to_string()).unwrap_or_else(|| "missing".into());
            return Err(IpnError::InvalidCreditsAmount { reference: reference.clone(), amount });
        },
    };
    Ok((user_id, effect))
}
