// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration module.
//!
//! Handles loading and saving application settings.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::device::UNNAMED_DEVICE;

const APP_DIR: &str = "bluetooth-pairing";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bluetooth settings.
    pub bluetooth: BluetoothConfig,

    /// Permission state at startup.
    pub permissions: PermissionConfig,

    /// Location services state at startup.
    pub location: LocationConfig,

    /// Device list settings.
    pub list: ListConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BluetoothConfig {
    /// Adapter to use, e.g. "hci0". The default adapter when unset.
    pub adapter: Option<String>,

    /// How long a discovery session runs.
    pub scan_timeout_secs: u64,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            adapter: None,
            scan_timeout_secs: 12,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionConfig {
    /// Whether location access is already granted.
    pub location_granted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Whether location services are on.
    pub services_enabled: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            services_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Shown in place of a missing device name.
    pub unnamed_label: String,

    /// Show each address at most once per session.
    pub dedupe_by_address: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            unnamed_label: UNNAMED_DEVICE.to_string(),
            dedupe_by_address: false,
        }
    }
}

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, writing the defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
