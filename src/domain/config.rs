//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the Matrix connection, the admin allow-list and auction settings.

use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub auction: AuctionConfig,
}

impl AppConfig {
    /// Reads and parses the YAML configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).context(crate::strings::messages::CONFIG_PARSE_ERROR)
    }
}

/// System-level settings for the bot.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct SystemConfig {
    /// Users allowed to close auctions. Empty means everyone.
    #[serde(default)]
    pub admin: Vec<String>,
}

impl SystemConfig {
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin.is_empty()
            || self
                .admin
                .iter()
                .any(|a| a.to_lowercase() == user_id.to_lowercase())
    }
}

/// Auction behaviour: announcement keywords, placeholder lot and reference timezone.
#[derive(Debug, Deserialize, Clone)]
pub struct AuctionConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_placeholder_lot")]
    pub placeholder_lot: String,
    #[serde(default)]
    pub utc_offset_hours: i32,
    /// Seconds between countdown refreshes of the status displays (0 disables).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            placeholder_lot: default_placeholder_lot(),
            utc_offset_hours: 0,
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl AuctionConfig {
    /// The reference timezone all deadlines are resolved and displayed in.
    /// Out-of-range offsets fall back to UTC.
    pub fn timezone(&self) -> FixedOffset {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(
                    "utc_offset_hours={} is out of range, using UTC",
                    self.utc_offset_hours
                );
                Utc.fix()
            })
    }
}

fn default_keywords() -> Vec<String> {
    vec!["Auction".to_string(), "Аукцион".to_string()]
}

fn default_placeholder_lot() -> String {
    "?".to_string()
}

fn default_refresh_interval() -> u64 {
    60
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
