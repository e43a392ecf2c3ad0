//! Broker configuration from environment variables

use tracing::info;
use zuklink_domain::routing::config::{RANDOM_SEED_KEY, TABLE_COUNT_KEY};
use zuklink_domain::routing::BuilderConfig;

/// Settings the broker reads at startup
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: String,
    /// Forwarded to the routing table builder
    pub builder: BuilderConfig,
}

impl BrokerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("BROKER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("BROKER_PORT").unwrap_or_else(|| "3000".to_string());

        let mut builder = BuilderConfig::new();
        if let Some(count) = lookup("ROUTING_TABLE_COUNT") {
            builder = builder.with(TABLE_COUNT_KEY, count);
        } else {
            info!("ROUTING_TABLE_COUNT not set, using builder default");
        }
        if let Some(seed) = lookup("ROUTING_RANDOM_SEED") {
            builder = builder.with(RANDOM_SEED_KEY, seed);
        }

        Self {
            host,
            port,
            builder,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
