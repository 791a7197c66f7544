//! Relying Party configuration
//!
//! Identity and lifetimes advertised to the browser and applied to stored state.

use std::time::Duration;

/// Relying Party settings for the single-user deployment
#[derive(Debug, Clone)]
pub struct RelyingPartyConfig {
    /// Explicit RP id; when `None` the request host is used
    pub rp_id: Option<String>,
    /// Human-readable RP name
    pub rp_name: String,
    /// Synthetic user handle (sent base64url-encoded)
    pub user_id: String,
    /// User name and display name
    pub user_name: String,
    /// Challenge lifetime
    pub challenge_ttl: Duration,
    /// Session token lifetime
    pub session_ttl: Duration,
    /// Ceremony timeout hint sent to the browser, in milliseconds
    pub timeout_ms: u32,
}

impl Default for RelyingPartyConfig {
    fn default() -> Self {
        Self {
            rp_id: None,
            rp_name: "Passkey Admin".to_string(),
            user_id: "admin".to_string(),
            user_name: "Admin".to_string(),
            challenge_ttl: Duration::from_secs(300),
            session_ttl: Duration::from_secs(604_800),
            timeout_ms: 60_000,
        }
    }
}

impl RelyingPartyConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `PASSKEY_RP_ID` - Relying Party ID (default: request host)
    /// - `PASSKEY_RP_NAME` - RP display name (default: "Passkey Admin")
    /// - `PASSKEY_USER_ID` / `PASSKEY_USER_NAME` (default: "admin" / "Admin")
    /// - `PASSKEY_CHALLENGE_TTL_SECS` (default: 300)
    /// - `PASSKEY_SESSION_TTL_SECS` (default: 604800)
    /// - `PASSKEY_TIMEOUT_MS` (default: 60000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let secs = |name: &str| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        Self {
            rp_id: non_empty("PASSKEY_RP_ID"),
            rp_name: non_empty("PASSKEY_RP_NAME").unwrap_or(defaults.rp_name),
            user_id: non_empty("PASSKEY_USER_ID").unwrap_or(defaults.user_id),
            user_name: non_empty("PASSKEY_USER_NAME").unwrap_or(defaults.user_name),
            challenge_ttl: secs("PASSKEY_CHALLENGE_TTL_SECS").unwrap_or(defaults.challenge_ttl),
            session_ttl: secs("PASSKEY_SESSION_TTL_SECS").unwrap_or(defaults.session_ttl),
            timeout_ms: std::env::var("PASSKEY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.timeout_ms),
        }
    }

    /// RP id for a request: the configured id, else the `Host` header without port
    pub fn resolve_rp_id(&self, host: Option<&str>) -> Option<String> {
        if let Some(id) = &self.rp_id {
            return Some(id.clone());
        }
        host.map(host_without_port).filter(|h| !h.is_empty())
    }
}

/// Strip a trailing `:port` from a Host header value
fn host_without_port(host: &str) -> String {
    let host = host.trim();
    if let Some(rest) = host.strip_prefix('[') {
        // IPv6 literal
        return match rest.split_once(']') {
            Some((addr, _)) => format!("[{addr}]"),
            None => host.to_string(),
        };
    }
    let name = match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    };
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelyingPartyConfig::default();
        assert_eq!(config.challenge_ttl, Duration::from_secs(300));
        assert_eq!(config.session_ttl, Duration::from_secs(604_800));
        assert_eq!(config.timeout_ms, 60_000);
        assert!(config.rp_id.is_none());
    }

    #[test]
    fn test_rp_id_from_host() {
        let config = RelyingPartyConfig::default();
        assert_eq!(
            config.resolve_rp_id(Some("Example.com:8443")).as_deref(),
            Some("example.com")
        );
        assert_eq!(config.resolve_rp_id(Some("localhost")).as_deref(), Some("localhost"));
        assert_eq!(config.resolve_rp_id(Some("[::1]:3000")).as_deref(), Some("[::1]"));
        assert_eq!(config.resolve_rp_id(Some("")), None);
        assert_eq!(config.resolve_rp_id(None), None);
    }

    #[test]
    fn test_explicit_rp_id_wins() {
        let config = RelyingPartyConfig {
            rp_id: Some("admin.example.com".into()),
            ..RelyingPartyConfig::default()
        };
        assert_eq!(
            config.resolve_rp_id(Some("other.example.com")).as_deref(),
            Some("admin.example.com")
        );
    }
}
