//! URL helpers shared by every gateway-bound request.
//!
//! Gateway base URLs come from configuration and are frequently written with a
//! trailing slash; endpoint paths are written with a leading one. These helpers
//! keep the joins free of double slashes and check that caller-supplied
//! targets are absolute before they are forwarded anywhere.

use reqwest::Url;

/// Strip trailing slashes from a base URL.
///
/// # Examples
///
/// ```
/// use chatgate::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://gw.example.com/"), "https://gw.example.com");
/// assert_eq!(normalize_base_url("https://gw.example.com//"), "https://gw.example.com");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a gateway base URL and an endpoint path with exactly one slash.
///
/// # Examples
///
/// ```
/// use chatgate::utils::url::gateway_endpoint;
///
/// assert_eq!(
///     gateway_endpoint("https://gw.example.com/", "/api/ai-proxy"),
///     "https://gw.example.com/api/ai-proxy"
/// );
/// ```
pub fn gateway_endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        path.trim_start_matches('/')
    )
}

/// Parse `value` and require it to be an absolute URL with a host-bearing
/// scheme. Relative references fail to parse and are rejected here.
pub fn parse_absolute_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|err| format!("{value:?} is not an absolute URL: {err}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("{value:?} is not a hierarchical URL"));
    }
    Ok(url)
}
