use ipn_engine::{
    db_types::{Account, FulfillmentEffect, GatewayStatus, StatusUpdate, TransactionRecord, TransactionReference},
    traits::{FulfillmentResult, StatusFetchError, StatusFetcher, TransactionStore, TransactionStoreError},
};
use mockall::mock;
use url::Url;

mock! {
    pub Store {}
    impl TransactionStore for Store {
        async fn fetch_transaction(&self, reference: &TransactionReference) -> Result<Option<TransactionRecord>, TransactionStoreError>;
        async fn update_transaction_status(&self, reference: &TransactionReference, update: &StatusUpdate) -> Result<TransactionRecord, TransactionStoreError>;
        async fn apply_fulfillment(&self, reference: &TransactionReference, user_id: &str, effect: &FulfillmentEffect) -> Result<FulfillmentResult, TransactionStoreError>;
        async fn fetch_account(&self, user_id: &str) -> Result<Option<Account>, TransactionStoreError>;
    }
}

mock! {
    pub Gateway {}
    impl StatusFetcher for Gateway {
        async fn fetch_status(&self, status_url: &Url) -> Result<GatewayStatus, StatusFetchError>;
    }
}
