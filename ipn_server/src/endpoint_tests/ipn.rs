use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use ipn_engine::{
    db_types::{Credits, Fulfillment, FulfillmentEffect, GatewayStatus},
    traits::{FulfillmentResult, StatusFetchError, TransactionStoreError},
};

use super::{
    helpers::{account, get_ipn, notification_api, post_ipn, record, send_request, status_url, StalledGateway},
    mocks::{MockGateway, MockStore},
};
use crate::routes::ipn_routes;

fn paid_fetcher() -> MockGateway {
    let mut fetcher = MockGateway::new();
    fetcher.expect_fetch_status().returning(|_| Ok(GatewayStatus::new("Paid", Some("G-1".into()))));
    fetcher
}

fn silent_fetcher() -> MockGateway {
    let mut fetcher = MockGateway::new();
    fetcher.expect_fetch_status().never();
    fetcher
}

/// A store with no expectations. Any call on it fails the test.
fn untouched_store() -> MockStore {
    MockStore::new()
}

fn register(cfg: &mut ServiceConfig, db: MockStore, fetcher: MockGateway) {
    cfg.app_data(web::Data::new(notification_api(db, fetcher)));
    ipn_routes::<MockStore, MockGateway>(cfg);
}

//---------------------------------------------   Validation   ---------------------------------------------------

fn configure_untouched(cfg: &mut ServiceConfig) {
    register(cfg, untouched_store(), silent_fetcher());
}

#[actix_web::test]
async fn missing_url() {
    let (status, body) = send_request(TestRequest::get().uri("/ipn"), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing `url` parameter");

    let (status, body) = send_request(TestRequest::post().uri("/ipn"), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing `url` parameter");

    let req = TestRequest::post().uri("/ipn").insert_header(("Content-Type", "application/json")).set_payload("{{{");
    let (status, body) = send_request(req, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing `url` parameter");
}

#[actix_web::test]
async fn invalid_url() {
    for url in ["not a url", "https://gateway.example.com/S1/TXN-100", "https://gateway.example.com/M1//TXN-100"] {
        let (status, body) = send_request(get_ipn(url), configure_untouched).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{url}");
        assert_eq!(body, "Invalid URL format");
    }
}

#[actix_web::test]
async fn merchant_mismatch_touches_nothing() {
    let (status, body) = send_request(get_ipn(&status_url("X", "S1", "TXN-100")), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid Merchant or Store ID");

    let (status, body) = send_request(post_ipn(&status_url("M1", "S2", "TXN-100")), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid Merchant or Store ID");
}

#[actix_web::test]
async fn other_methods_are_not_allowed() {
    for req in [TestRequest::put(), TestRequest::delete(), TestRequest::patch()] {
        let (status, body) = send_request(req.uri("/ipn"), configure_untouched).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, "Method Not Allowed");
    }
}

//---------------------------------------------   Reconciliation   ---------------------------------------------------

fn configure_not_found(cfg: &mut ServiceConfig) {
    let mut db = MockStore::new();
    db.expect_fetch_transaction().times(1).returning(|_| Ok(None));
    db.expect_update_transaction_status().never();
    db.expect_apply_fulfillment().never();
    register(cfg, db, paid_fetcher());
}

#[actix_web::test]
async fn unknown_transaction() {
    let (status, body) = send_request(get_ipn(&status_url("M1", "S1", "TXN-404")), configure_not_found).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Transaction not found");
}

fn configure_credits(cfg: &mut ServiceConfig) {
    let mut db = MockStore::new();
    let credits = Fulfillment::Credits { amount: Some(Credits::from(50)) };
    let rec = record("TXN-101", "U2", credits, false);
    let stored = rec.clone();
    db.expect_fetch_transaction().times(1).returning(move |_| Ok(Some(stored.clone())));
    db.expect_update_transaction_status().times(1).returning(move |_, update| {
        assert_eq!(update.status, "Paid");
        assert_eq!(update.gateway_transaction_id, "G-1");
        Ok(rec.clone())
    });
    db.expect_apply_fulfillment().times(1).returning(|reference, user_id, effect| {
        assert_eq!(reference.as_str(), "TXN-101");
        assert_eq!(user_id.to_string(), "U2");
        assert!(matches!(effect, FulfillmentEffect::GrantCredits(c) if c.value() == 50));
        Ok(FulfillmentResult::Applied(account("U2", 60)))
    });
    register(cfg, db, paid_fetcher());
}

#[actix_web::test]
async fn paid_credits_are_fulfilled() {
    let (status, body) = send_request(post_ipn(&status_url("M1", "S1", "TXN-101")), configure_credits).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "IPN Processed Successfully");
}

fn configure_already_fulfilled(cfg: &mut ServiceConfig) {
    let mut db = MockStore::new();
    let rec = record("TXN-100", "U1", Fulfillment::Subscription { plan: "Gold".into() }, true);
    let stored = rec.clone();
    db.expect_fetch_transaction().returning(move |_| Ok(Some(stored.clone())));
    db.expect_update_transaction_status().times(1).returning(move |_, _| Ok(rec.clone()));
    db.expect_apply_fulfillment().never();
    register(cfg, db, paid_fetcher());
}

#[actix_web::test]
async fn redelivered_notification_succeeds_without_fulfilling() {
    let (status, body) = send_request(get_ipn(&status_url("M1", "S1", "TXN-100")), configure_already_fulfilled).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "IPN Processed Successfully");
}

fn configure_missing_account(cfg: &mut ServiceConfig) {
    let mut db = MockStore::new();
    let rec = record("TXN-104", "GHOST", Fulfillment::Credits { amount: Some(Credits::from(5)) }, false);
    let stored = rec.clone();
    db.expect_fetch_transaction().returning(move |_| Ok(Some(stored.clone())));
    db.expect_update_transaction_status().times(1).returning(move |_, _| Ok(rec.clone()));
    db.expect_apply_fulfillment().times(1).returning(|reference, user_id, _| {
        Err(TransactionStoreError::AccountNotFound { reference: reference.clone(), user_id: user_id.to_string() })
    });
    register(cfg, db, paid_fetcher());
}

#[actix_web::test]
async fn missing_account_is_a_client_error() {
    let (status, body) = send_request(get_ipn(&status_url("M1", "S1", "TXN-104")), configure_missing_account).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Incomplete transaction");
}

fn configure_invalid_amount(cfg: &mut ServiceConfig) {
    let mut db = MockStore::new();
    let rec = record("TXN-102", "U2", Fulfillment::Credits { amount: None }, false);
    let stored = rec.clone();
    db.expect_fetch_transaction().returning(move |_| Ok(Some(stored.clone())));
    db.expect_update_transaction_status().times(1).returning(move |_, _| Ok(rec.clone()));
    db.expect_apply_fulfillment().never();
    register(cfg, db, paid_fetcher());
}

#[actix_web::test]
async fn missing_credit_amount() {
    let (status, body) = send_request(get_ipn(&status_url("M1", "S1", "TXN-102")), configure_invalid_amount).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid credits amount");
}

//---------------------------------------------   Infrastructure   ---------------------------------------------------

fn configure_stalled_gateway(cfg: &mut ServiceConfig) {
    cfg.app_data(web::Data::new(notification_api(untouched_store(), StalledGateway)));
    ipn_routes::<MockStore, StalledGateway>(cfg);
}

#[actix_web::test]
async fn gateway_timeout() {
    let (status, body) = send_request(get_ipn(&status_url("M1", "S1", "TXN-100")), configure_stalled_gateway).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

fn configure_gateway_error(cfg: &mut ServiceConfig) {
    let mut fetcher = MockGateway::new();
    fetcher
        .expect_fetch_status()
        .times(1)
        .returning(|_| Err(StatusFetchError::HttpStatus { status: 502, message: "Bad Gateway".into() }));
    register(cfg, untouched_store(), fetcher);
}

#[actix_web::test]
async fn gateway_error() {
    let (status, body) = send_request(get_ipn(&status_url("M1", "S1", "TXN-100")), configure_gateway_error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

fn configure_store_down(cfg: &mut ServiceConfig) {
    let mut db = MockStore::new();
    db.expect_fetch_transaction().returning(|_| Err(TransactionStoreError::DatabaseError("disk I/O error".into())));
    db.expect_update_transaction_status().never();
    register(cfg, db, paid_fetcher());
}

#[actix_web::test]
async fn store_unavailable() {
    let (status, body) = send_request(get_ipn(&status_url("M1", "S1", "TXN-100")), configure_store_down).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}
