use serde::{Deserialize, Serialize};

/// An inbound notification. The gateway sends it either as a query string (`GET /ipn?url=...`) or as a JSON body
/// (`POST /ipn` with `{"url": "..."}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpnParams {
    pub url: Option<String>,
}
