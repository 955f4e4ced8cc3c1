//! Session configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{CoreError, Result};

/// Tunables for one terminal session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Backend origin (`http(s)://host:port`) or a full `ws(s)://` endpoint
    pub backend_url: String,
    /// Reconnection attempts before giving up
    pub max_retries: u32,
    /// Fixed delay between reconnection attempts
    pub reconnect_delay_ms: u64,
    /// Upper bound on TCP connect plus WebSocket handshake
    pub connect_timeout_ms: u64,
    /// Stats poll period, 0 disables polling
    pub stats_interval_ms: u64,
    /// Working path shown in the prompt and sent with AI queries
    pub working_path: String,
    pub suggestions_enabled: bool,
    /// Buffered events per subscriber before it starts lagging
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            max_retries: 5,
            reconnect_delay_ms: 3000,
            connect_timeout_ms: 10_000,
            stats_interval_ms: 5000,
            working_path: "~".to_string(),
            suggestions_enabled: true,
            event_capacity: 256,
        }
    }
}

impl SessionConfig {
    /// Default configuration pointed at `backend_url`
    pub fn for_backend(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Default::default()
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// `None` when polling is disabled
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_ms > 0).then(|| Duration::from_millis(self.stats_interval_ms))
    }

    /// WebSocket endpoint for the backend
    ///
    /// `https` maps to `wss` and `http` to `ws`, with `/ws` appended.
    /// `ws(s)` URLs are used as given.
    pub fn ws_url(&self) -> Result<String> {
        let url = self.backend_url.trim();

        if url.starts_with("ws://") || url.starts_with("wss://") {
            return Ok(url.to_string());
        }

        let (scheme, rest) = if let Some(rest) = url.strip_prefix("https://") {
            ("wss://", rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            ("ws://", rest)
        } else {
            return Err(CoreError::InvalidUrl(url.to_string()));
        };

        let rest = rest.trim_end_matches('/');
        if rest.is_empty() {
            return Err(CoreError::InvalidUrl(url.to_string()));
        }

        Ok(format!("{}{}/ws", scheme, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.stats_interval(), Some(Duration::from_secs(5)));
        assert!(config.suggestions_enabled);
    }

    #[test]
    fn test_ws_url_mirrors_scheme() {
        let secure = SessionConfig::for_backend("https://term.example.com");
        assert_eq!(secure.ws_url().unwrap(), "wss://term.example.com/ws");

        let plain = SessionConfig::for_backend("http://127.0.0.1:8000/");
        assert_eq!(plain.ws_url().unwrap(), "ws://127.0.0.1:8000/ws");
    }

    #[test]
    fn test_ws_url_passthrough() {
        let config = SessionConfig::for_backend("ws://localhost:9000/socket");
        assert_eq!(config.ws_url().unwrap(), "ws://localhost:9000/socket");
    }

    #[test]
    fn test_ws_url_rejects_unknown_scheme() {
        assert!(SessionConfig::for_backend("ftp://host").ws_url().is_err());
        assert!(SessionConfig::for_backend("http://").ws_url().is_err());
    }

    #[test]
    fn test_zero_interval_disables_polling() {
        let config = SessionConfig {
            stats_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.stats_interval(), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"backend_url":"https://x.test","max_retries":2}"#).unwrap();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.reconnect_delay_ms, 3000);
    }
}
