// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.

use serde::{Deserialize, Serialize};

fn default_bind_address() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_max_pending_runs() -> usize {
    32
}

/// `[server]` section of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request bodies above this size are rejected before parsing
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Analyzed runs kept until their dashboard is viewed
    #[serde(default = "default_max_pending_runs")]
    pub max_pending_runs: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            max_pending_runs: default_max_pending_runs(),
        }
    }
}

impl ServerSettings {
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let settings: ServerSettings = toml::from_str("port = 9000").unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.bind_address, "0.0.0.0");
        assert_eq!(settings.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(settings.max_pending_runs, 32);
        assert_eq!(settings.socket_addr(), "0.0.0.0:9000");
    }
}
