use std::time::Duration;

use actix_web::{
    dev::{Server, Service},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::future::{ok, Either};
use ipn_engine::{NotificationFlowApi, ReconciliationApi, SqliteDatabase};
use log::{info, warn};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    helpers::get_remote_ip,
    integrations::gateway::GatewayClient,
    routes::{health, ipn_routes},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if config.run_migrations {
        SqliteDatabase::create_if_missing(&config.database_url)
            .await
            .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    }
    let gateway = GatewayClient::new(config.gateway.timeout)?;
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: GatewayClient,
) -> Result<Server, ServerError> {
    let ServerConfig {
        host, port, merchant, paid_status, gateway: gateway_config, use_x_forwarded_for, use_forwarded, ..
    } = config;
    info!(
        "💻️ Accepting notifications for merchant '{}', store '{}'. Paid status is '{paid_status}'.",
        merchant.merchant_id, merchant.store_id
    );
    let srv = HttpServer::new(move || {
        let reconciler = ReconciliationApi::new(db.clone(), paid_status.clone());
        let ipn_api = NotificationFlowApi::new(reconciler, gateway.clone(), merchant.clone(), gateway_config.timeout);
        let whitelist = gateway_config.whitelist.clone();
        let ipn_scope = web::scope("")
            .wrap_fn(move |req, srv| {
                let peer_ip = get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded);
                let whitelisted = match (peer_ip, &whitelist) {
                    (_, None) => true,
                    (Some(ip), Some(whitelist)) => {
                        info!("💻️ Notification from {ip}");
                        whitelist.contains(&ip)
                    },
                    (None, Some(_)) => {
                        warn!("💻️ No IP address found in the notification request, denying access.");
                        false
                    },
                };
                if whitelisted {
                    Either::Left(srv.call(req))
                } else {
                    warn!("💻️ Notification from {peer_ip:?} is not from a whitelisted address.");
                    Either::Right(ok::<_, actix_web::Error>(req.error_response(ServerError::ForbiddenPeer)))
                }
            })
            .configure(ipn_routes::<SqliteDatabase, GatewayClient>);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ipn::access_log"))
            .app_data(web::Data::new(ipn_api))
            .service(health)
            .service(ipn_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
