use axum::http::HeaderMap;
use nightschool_domain::CallerKey;

/// Derives the rate-limit bucket from proxy address headers.
///
/// Uses the first `x-forwarded-for` entry, then `x-real-ip`. Requests with
/// neither share the placeholder bucket.
pub fn caller_key_from_headers(headers: &HeaderMap) -> CallerKey {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok());

    forwarded_for
        .into_iter()
        .chain(real_ip)
        .find_map(|candidate| CallerKey::new(candidate).ok())
        .unwrap_or_else(CallerKey::unknown)
}
