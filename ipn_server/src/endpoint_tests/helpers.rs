use std::time::Duration;

use actix_web::{body::MessageBody, dev::ServiceResponse, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Utc;
use ipn_engine::{
    db_types::{Account, Credits, Fulfillment, GatewayStatus, TransactionRecord},
    traits::{StatusFetchError, StatusFetcher},
    MerchantIdentity,
    NotificationFlowApi,
    ReconciliationApi,
};
use log::debug;
use serde_json::json;
use url::Url;

pub const GATEWAY: &str = "https://gateway.example.com/api/transaction/status";

/// The identity every endpoint test is configured with.
pub fn merchant() -> MerchantIdentity {
    MerchantIdentity::new("M1", "S1")
}

pub fn notification_api<B, F>(db: B, fetcher: F) -> NotificationFlowApi<B, F> {
    NotificationFlowApi::new(ReconciliationApi::new(db, "Paid"), fetcher, merchant(), Duration::from_millis(250))
}

pub fn status_url(merchant_id: &str, store_id: &str, reference: &str) -> String {
    format!("{GATEWAY}/{merchant_id}/{store_id}/{reference}")
}

pub fn get_ipn(url: &str) -> TestRequest {
    let encoded = url::form_urlencoded::byte_serialize(url.as_bytes()).collect::<String>();
    TestRequest::get().uri(&format!("/ipn?url={encoded}"))
}

pub fn post_ipn(url: &str) -> TestRequest {
    TestRequest::post().uri("/ipn").set_json(json!({ "url": url }))
}

pub async fn send_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let _ = env_logger::try_init();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    into_parts(res)
}

pub fn into_parts(res: ServiceResponse) -> (StatusCode, String) {
    let (_, res) = res.into_parts();
    let status = res.status();
    let body = res.into_body().try_into_bytes().unwrap_or_default();
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub fn record(reference: &str, user_id: &str, fulfillment: Fulfillment, fulfilled: bool) -> TransactionRecord {
    TransactionRecord {
        reference: reference.into(),
        status: "Initiated".into(),
        gateway_transaction_id: None,
        user_id: Some(user_id.to_string()),
        fulfillment: Some(fulfillment),
        fulfilled,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn account(user_id: &str, credits: i64) -> Account {
    Account {
        user_id: user_id.to_string(),
        credits: Credits::from(credits),
        subscription_plan: None,
        subscription_start: None,
        subscription_end: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A gateway that never answers within the configured timeout.
pub struct StalledGateway;

impl StatusFetcher for StalledGateway {
    async fn fetch_status(&self, _status_url: &Url) -> Result<GatewayStatus, StatusFetchError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(GatewayStatus::new("Paid", None))
    }
}
