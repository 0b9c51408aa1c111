use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for a `Client`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request timeout covering connect, send and receive.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_to_thirty_seconds() {
        let config: ClientConfig = serde_json::from_str(r#"{"base_url":"https://koi.example"}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config, ClientConfig::new("https://koi.example"));
    }
}
