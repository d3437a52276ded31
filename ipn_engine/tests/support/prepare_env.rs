use ipn_engine::{
    db_types::{NewAccount, NewTransaction},
    test_utils::prepare_env::{prepare_test_env as prepare_db, random_db_path},
    SqliteDatabase,
};

/// A freshly migrated database in the temp directory, unique to the calling test.
pub async fn prepare_test_env() -> SqliteDatabase {
    prepare_db(&random_db_path()).await
}

/// The accounts and transactions every reconciliation test starts from.
pub async fn seed(db: &SqliteDatabase) {
    for (user, credits) in [("U1", 0), ("U2", 10), ("U3", 0)] {
        db.insert_account(NewAccount::new(user, credits)).await.expect("Error inserting account");
    }
    let transactions = [
        NewTransaction::new("TXN-100", "U1").for_subscription("Gold"),
        NewTransaction::new("TXN-101", "U2").for_credits(50),
        NewTransaction::new("TXN-102", "U2").for_credits(0),
        NewTransaction::new("TXN-103", "U1").for_subscription("Gold").without_user(),
        NewTransaction::new("TXN-104", "GHOST").for_credits(25),
        NewTransaction::new("TXN-105", "U1").with_status("Pending").for_subscription("Silver"),
    ];
    for tx in transactions {
        db.insert_transaction(tx).await.expect("Error inserting transaction");
    }
}
