//! Server configuration.
//!
//! Values come from [`ServerConfig::default`], optionally overlaid with environment
//! variables by [`ServerConfig::from_env`]:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `OT_SNAPSHOT_INTERVAL` | `snapshot_interval` | `10` |
//! | `OT_BIND_ADDR` | `bind_addr` | `127.0.0.1:3000` |
//! | `OT_MAX_OPERATION_BYTES` | `max_operation_bytes` | `1048576` |
//!
//! Unparsable values are logged and the default is kept.

use serde::Deserialize;
use std::str::FromStr;

/// Configuration for the coordinator and its HTTP binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Write a snapshot after every Nth accepted operation; `0` disables snapshots
    pub snapshot_interval: u64,

    /// Address the demo server binds to
    pub bind_addr: String,

    /// Largest accepted request body for an operation submission, in bytes
    pub max_operation_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 10,
            bind_addr: "127.0.0.1:3000".to_string(),
            max_operation_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with `OT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_var(&lookup, "OT_SNAPSHOT_INTERVAL") {
            config.snapshot_interval = value;
        }
        if let Some(addr) = lookup("OT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(value) = parse_var(&lookup, "OT_MAX_OPERATION_BYTES") {
            config.max_operation_bytes = value;
        }

        config
    }

    /// Whether `version` should be followed by a snapshot.
    #[inline]
    pub fn is_snapshot_version(&self, version: u64) -> bool {
        self.snapshot_interval != 0 && version % self.snapshot_interval == 0
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("{} has invalid value {:?}, using default", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.snapshot_interval, 10);
        assert!(config.is_snapshot_version(10));
        assert!(config.is_snapshot_version(20));
        assert!(!config.is_snapshot_version(11));
    }

    #[test]
    fn test_zero_interval_disables_snapshots() {
        let config = ServerConfig {
            snapshot_interval: 0,
            ..Default::default()
        };
        assert!(!config.is_snapshot_version(0));
        assert!(!config.is_snapshot_version(10));
    }

    #[test]
    fn test_from_lookup_overlays() {
        let vars: HashMap<&str, &str> = [
            ("OT_SNAPSHOT_INTERVAL", "5"),
            ("OT_BIND_ADDR", "0.0.0.0:8000"),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.snapshot_interval, 5);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.max_operation_bytes, 1024 * 1024);
    }

    #[test]
    fn test_invalid_value_keeps_default() {
        let config = ServerConfig::from_lookup(|key| {
            (key == "OT_SNAPSHOT_INTERVAL").then(|| "often".to_string())
        });
        assert_eq!(config.snapshot_interval, 10);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ServerConfig = serde_json::from_str(r#"{"snapshot_interval": 3}"#).unwrap();
        assert_eq!(config.snapshot_interval, 3);
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
    }
}
