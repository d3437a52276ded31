use crate::db_types::Account;

/// The result of asking the store to apply a fulfillment effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentResult {
    /// The effect was applied. Holds the account as it is after the change.
    Applied(Account),
    /// The transaction had already been fulfilled. Nothing was changed.
    AlreadyFulfilled,
}
