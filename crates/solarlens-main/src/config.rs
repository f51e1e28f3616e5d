// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solarlens_core::AnalysisConfig;
use solarlens_web::ServerSettings;
use std::path::Path;
use tracing::{info, warn};

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = "solarlens.toml";

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// `[columns]`, `[detection]` and `[summary]` sections
    #[serde(flatten)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub server: ServerSettings,
}

impl AppConfig {
    /// Load from an explicit path, or from [`DEFAULT_CONFIG_PATH`] when it
    /// exists, falling back to built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    warn!("No configuration file found, using defaults");
                    let config = Self::default();
                    config.validate()?;
                    Ok(config)
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("✅ Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.analysis
            .validate()
            .context("Invalid detection configuration")?;
        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("server.max_upload_bytes must be greater than zero");
        }
        Ok(())
    }
}
