//! Shared helpers for the outbound HTTP clients.

/// User agent presented by every outbound client.
pub(crate) const USER_AGENT: &str = "docrelay/0.2";

/// Parse and normalize a collaborator base URL, trimming any trailing slash.
pub(crate) fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

/// Join a base URL and a relative path without doubling separators.
pub(crate) fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
