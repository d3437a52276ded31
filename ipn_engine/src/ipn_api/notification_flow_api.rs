use std::{fmt::Debug, time::Duration};

use log::*;
use url::Url;

use crate::{
    db_types::GatewayStatus,
    helpers::{parse_status_url, MerchantIdentity},
    ipn_api::{
        errors::IpnError,
        reconciliation_api::{ReconciliationApi, ReconciliationOutcome},
    },
    traits::{StatusFetchError, StatusFetcher, TransactionStore},
};

/// `NotificationFlowApi` handles an inbound payment notification from start to finish:
/// parse → validate merchant → fetch status → reconcile.
pub struct NotificationFlowApi<B, F> {
    reconciler: ReconciliationApi<B>,
    fetcher: F,
    merchant: MerchantIdentity,
    fetch_timeout: Duration,
}

impl<B, F> Debug for NotificationFlowApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NotificationFlowApi (merchant: {}, store: {}, timeout: {:?})",
            self.merchant.merchant_id, self.merchant.store_id, self.fetch_timeout
        )
    }
}

impl<B, F> NotificationFlowApi<B, F> {
    pub fn new(reconciler: ReconciliationApi<B>, fetcher: F, merchant: MerchantIdentity, fetch_timeout: Duration) -> Self {
        Self { reconciler, fetcher, merchant, fetch_timeout }
    }

    pub fn reconciler(&self) -> &ReconciliationApi<B> {
        &self.reconciler
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn merchant(&self) -> &MerchantIdentity {
        &self.merchant
    }
}

impl<B, F> NotificationFlowApi<B, F>
where
    B: TransactionStore,
    F: StatusFetcher,
{
    /// Processes a notification whose status-check URL is `url`.
    ///
    /// The URL is parsed and the merchant identity it claims is checked before the gateway or the store is contacted.
    /// The status fetch is bounded by the configured timeout. A timeout, like any other fetch failure, is reported as
    /// [`IpnError::GatewayUnavailable`] and leaves the store untouched.
    pub async fn process_notification(&self, url: Option<&str>) -> Result<ReconciliationOutcome, IpnError> {
        let (status_url, target) = parse_status_url(url).map_err(|e| {
            info!("🔔️ Rejecting malformed notification. {e}");
            IpnError::from(e)
        })?;
        self.merchant.validate(&target)?;
        trace!("🔔️ Notification for {} passed merchant validation", target.reference);
        let status = self.fetch_status(&status_url).await?;
        debug!("🔔️ Gateway reports {} for {}", status.status, target.reference);
        let outcome = self.reconciler.reconcile(&target.reference, &status).await?;
        info!("🔔️ Notification for {} processed: {outcome}", target.reference);
        Ok(outcome)
    }

    async fn fetch_status(&self, status_url: &Url) -> Result<GatewayStatus, IpnError> {
        let result = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch_status(status_url)).await {
            Ok(result) => result,
            Err(_) => Err(StatusFetchError::Timeout(self.fetch_timeout.as_millis())),
        };
        result.map_err(|e| {
            error!("🔔️ Could not fetch the transaction status from {status_url}. {e}");
            IpnError::from(e)
        })
    }
}
