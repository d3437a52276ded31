use log::warn;

use crate::{db_types::NotificationTarget, ipn_api::errors::IpnError};

/// The merchant identity this listener accepts notifications for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantIdentity {
    pub merchant_id: String,
    pub store_id: String,
}

impl MerchantIdentity {
    pub fn new(merchant_id: &str, store_id: &str) -> Self {
        Self { merchant_id: merchant_id.to_string(), store_id: store_id.to_string() }
    }

    /// Exact comparison of both identifiers. This must pass before the gateway or the store is touched, so that one
    /// merchant's callback can never change another merchant's transaction.
    pub fn validate(&self, target: &NotificationTarget) -> Result<(), IpnError> {
        if target.merchant_id == self.merchant_id && target.store_id == self.store_id {
            Ok(())
        } else {
            warn!(
                "🔔️ Notification for {} claims merchant '{}' and store '{}', which is not us.",
                target.reference, target.merchant_id, target.store_id
            );
            Err(IpnError::MerchantMismatch { merchant_id: target.merchant_id.clone(), store_id: target.store_id.clone() })
        }
    }
}
