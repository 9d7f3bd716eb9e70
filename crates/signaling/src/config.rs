//! Server configuration.

use crate::error::ServerError;

/// Configuration for the signaling server
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Address to bind the listener to
    pub bind_addr: String,

    /// Port to listen on
    pub port: u16,

    /// Origins allowed to open a WebSocket connection. An empty list
    /// allows any origin (including non-browser clients that send none).
    pub allowed_origins: Vec<String>,

    /// Probability that a join request is paired with the waiting head
    /// instead of being re-queued. `None` selects deterministic FIFO
    /// pairing.
    pub pair_chance: Option<f64>,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: Vec::new(),
            pair_chance: None,
        }
    }
}

impl SignalingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ServerError> {
        if let Some(chance) = self.pair_chance {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ServerError::Config(format!(
                    "pair_chance must be within [0, 1], got {chance}"
                )));
            }
        }
        if self.bind_addr.is_empty() {
            return Err(ServerError::Config("bind_addr must not be empty".to_string()));
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Whether a handshake with the given `Origin` header may proceed
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        match origin {
            Some(origin) => self.allowed_origins.iter().any(|allowed| allowed == origin),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SignalingConfig::default();
        config.validate().unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn pair_chance_out_of_range_is_rejected() {
        let config = SignalingConfig {
            pair_chance: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn empty_allow_list_admits_everyone() {
        let config = SignalingConfig::default();
        assert!(config.origin_allowed(Some("https://anywhere.example")));
        assert!(config.origin_allowed(None));
    }

    #[test]
    fn allow_list_is_exact_match() {
        let config = SignalingConfig {
            allowed_origins: vec!["https://app.example".to_string()],
            ..Default::default()
        };
        assert!(config.origin_allowed(Some("https://app.example")));
        assert!(!config.origin_allowed(Some("https://evil.example")));
        assert!(!config.origin_allowed(None));
    }
}
