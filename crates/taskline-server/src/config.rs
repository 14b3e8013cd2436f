//! Server configuration from environment variables.

use taskline_core::defaults;

/// Runtime configuration for the realtime service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host for the HTTP/WebSocket listener.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// NATS server URL for event intake.
    pub nats_url: String,
    /// Base URL of the Team Directory service.
    pub team_api_url: String,
    /// Whether to start the topic consumers. Disabled for transport-only
    /// deployments and in tests that run without a broker.
    pub intake_enabled: bool,
    /// Outbound queue capacity per client session.
    pub queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            nats_url: defaults::NATS_URL.to_string(),
            team_api_url: defaults::TEAM_API_URL.to_string(),
            intake_enabled: true,
            queue_capacity: defaults::OUTBOUND_QUEUE_CAPACITY,
        }
    }
}

impl Config {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `HOST` | `0.0.0.0` | Bind host |
    /// | `PORT` | `8084` | Bind port |
    /// | `NATS_URL` | `nats://localhost:4222` | Event broker |
    /// | `TEAM_API_URL` | `http://localhost:8083` | Team Directory base URL |
    /// | `INTAKE_ENABLED` | `true` | Start topic consumers |
    /// | `WS_QUEUE_CAPACITY` | `256` | Per-session outbound queue size |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let nats_url = std::env::var("NATS_URL").unwrap_or(defaults.nats_url);
        let team_api_url = std::env::var("TEAM_API_URL").unwrap_or(defaults.team_api_url);
        let intake_enabled = std::env::var("INTAKE_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let queue_capacity = std::env::var("WS_QUEUE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.queue_capacity);

        Self {
            host,
            port,
            nats_url,
            team_api_url,
            intake_enabled,
            queue_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8084);
        assert_eq!(config.queue_capacity, 256);
        assert!(config.intake_enabled);
    }
}
