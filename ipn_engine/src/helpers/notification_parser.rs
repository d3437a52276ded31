use log::trace;
use url::Url;

use crate::{db_types::NotificationTarget, ipn_api::errors::MalformedReason};

/// Parses the status-check URL carried by a notification.
///
/// The last three path segments are, in order, the merchant id, the store id and the transaction reference. The
/// segments are returned verbatim (no percent-decoding), and the depth of the prefix in front of them is irrelevant.
pub fn parse_status_url(url: Option<&str>) -> Result<(Url, NotificationTarget), MalformedReason> {
    let raw = url.map(str::trim).filter(|s| !s.is_empty()).ok_or(MalformedReason::MissingUrl)?;
    let url = Url::parse(raw).map_err(|e| MalformedReason::UnparseableUrl(e.to_string()))?;
    let segments = url.path_segments().map(|s| s.collect::<Vec<&str>>()).unwrap_or_default();
    trace!("🔔️ Status URL has {} path segments", segments.len());
    let [merchant_id, store_id, reference] = match segments.as_slice() {
        [.., m, s, r] => [*m, *s, *r],
        _ => return Err(MalformedReason::TooFewSegments(segments.len())),
    };
    if merchant_id.is_empty() || store_id.is_empty() || reference.is_empty() {
        return Err(MalformedReason::EmptySegment);
    }
    let target = NotificationTarget {
        merchant_id: merchant_id.to_string(),
        store_id: store_id.to_string(),
        reference: reference.into(),
    };
    Ok((url, target))
}
