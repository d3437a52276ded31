use std::{env, net::IpAddr, time::Duration};

use ipn_engine::{db_types::DEFAULT_PAID_STATUS, sqlite::db::db_url, MerchantIdentity};
use log::*;

const DEFAULT_IPN_HOST: &str = "127.0.0.1";
const DEFAULT_IPN_PORT: u16 = 8370;
const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The merchant and store that notifications must be addressed to.
    pub merchant: MerchantIdentity,
    /// The gateway status value that means a transaction has been paid.
    pub paid_status: String,
    pub gateway: GatewayConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// Apply the embedded database migrations at start-up.
    pub run_migrations: bool,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// The upper bound on a single status fetch.
    pub timeout: Duration,
    /// If supplied, requests against `/ipn` will be checked against this whitelist of gateway IP addresses.
    /// To explicitly disable the whitelist, set this to "false", "none", or "0".
    pub whitelist: Option<Vec<IpAddr>>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { timeout: DEFAULT_GATEWAY_TIMEOUT, whitelist: None }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_IPN_HOST.to_string(),
            port: DEFAULT_IPN_PORT,
            database_url: String::default(),
            merchant: MerchantIdentity::default(),
            paid_status: DEFAULT_PAID_STATUS.to_string(),
            gateway: GatewayConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("IPN_HOST").ok().unwrap_or_else(|| DEFAULT_IPN_HOST.into());
        let port = env::var("IPN_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for IPN_PORT. {e} Using the default, {DEFAULT_IPN_PORT}, instead."
                    );
                    DEFAULT_IPN_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_IPN_PORT);
        let database_url = db_url();
        let merchant_id = env::var("IPN_MERCHANT_ID").ok().unwrap_or_else(|| {
            error!("🪛️ IPN_MERCHANT_ID is not set. Every notification will be rejected until it is.");
            String::default()
        });
        let store_id = env::var("IPN_STORE_ID").ok().unwrap_or_else(|| {
            error!("🪛️ IPN_STORE_ID is not set. Every notification will be rejected until it is.");
            String::default()
        });
        let paid_status = env::var("IPN_PAID_STATUS").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            info!("🪛️ IPN_PAID_STATUS is not set. Using the default, {DEFAULT_PAID_STATUS}.");
            DEFAULT_PAID_STATUS.to_string()
        });
        let gateway = GatewayConfig::from_env_or_defaults();
        let use_x_forwarded_for = env_flag("IPN_USE_X_FORWARDED_FOR", false);
        let use_forwarded = env_flag("IPN_USE_FORWARDED", false);
        let run_migrations = env_flag("IPN_RUN_MIGRATIONS", true);
        Self {
            host,
            port,
            database_url,
            merchant: MerchantIdentity::new(&merchant_id, &store_id),
            paid_status,
            gateway,
            use_x_forwarded_for,
            use_forwarded,
            run_migrations,
        }
    }
}

impl GatewayConfig {
    pub fn from_env_or_defaults() -> Self {
        let timeout = env::var("IPN_GATEWAY_TIMEOUT")
            .map_err(|_| {
                info!(
                    "🪛️ IPN_GATEWAY_TIMEOUT is not set. Using the default value of {} s.",
                    DEFAULT_GATEWAY_TIMEOUT.as_secs()
                )
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for IPN_GATEWAY_TIMEOUT. {e}"))
            })
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT);
        let whitelist = env::var("IPN_GATEWAY_IP_WHITELIST").ok().and_then(|s| parse_whitelist(&s));
        match &whitelist {
            Some(whitelist) if whitelist.is_empty() => {
                warn!(
                    "🚨️ The gateway IP whitelist was configured, but is empty. The server will run, but won't accept \
                     any notifications."
                );
            },
            None => {
                info!("🪛️ No gateway IP whitelist is set. Notifications are accepted from any address.");
            },
            Some(v) => {
                let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                info!("🪛️ Gateway IP whitelist: {addrs}");
            },
        }
        Self { timeout, whitelist }
    }
}

fn parse_whitelist(s: &str) -> Option<Vec<IpAddr>> {
    if ["none", "false", "0"].contains(&s.trim().to_lowercase().as_str()) {
        info!(
            "🪛️ Gateway IP whitelist is disabled. If this is not what you want, set IPN_GATEWAY_IP_WHITELIST to a \
             comma-separated list of IP addresses to enable it."
        );
        return None;
    }
    let ip_addrs = s
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            s.parse::<IpAddr>()
                .map_err(|e| warn!("🪛️ Ignoring invalid IP address ({s}) in IPN_GATEWAY_IP_WHITELIST: {e}"))
                .ok()
        })
        .collect::<Vec<IpAddr>>();
    Some(ip_addrs)
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name).map(|s| parse_flag(&s, default)).unwrap_or(default)
}

fn parse_flag(s: &str, default: bool) -> bool {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => true,
        "0" | "false" | "no" => false,
        _ => default,
    }
}
