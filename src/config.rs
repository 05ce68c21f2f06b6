//! Runtime settings: threshold network domain, ritual and wallet network.
//!
//! Loaded from TOML with every field optional, then overridden from the
//! environment:
//!
//! | Variable                        | Field               |
//! |---------------------------------|---------------------|
//! | `TACO_BLOCKS_DOMAIN`            | `domain`            |
//! | `TACO_BLOCKS_RITUAL_ID`         | `ritual_id`         |
//! | `TACO_BLOCKS_EXPECTED_CHAIN_ID` | `expected_chain_id` |
//! | `TACO_BLOCKS_PORTER_URL`        | `porter_url`        |

use crate::condition::chain::POLYGON_AMOY;
use crate::condition::is_supported_chain;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const ENV_DOMAIN: &str = "TACO_BLOCKS_DOMAIN";
pub const ENV_RITUAL_ID: &str = "TACO_BLOCKS_RITUAL_ID";
pub const ENV_EXPECTED_CHAIN_ID: &str = "TACO_BLOCKS_EXPECTED_CHAIN_ID";
pub const ENV_PORTER_URL: &str = "TACO_BLOCKS_PORTER_URL";

/// Threshold network the SDK talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Devnet,
    #[default]
    Testnet,
}

impl Domain {
    /// Ritual used when none is configured explicitly.
    pub fn default_ritual_id(self) -> u32 {
        match self {
            Domain::Devnet => 27,
            Domain::Testnet => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Devnet => "devnet",
            Domain::Testnet => "testnet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "devnet" | "lynx" => Some(Domain::Devnet),
            "testnet" | "tapir" => Some(Domain::Testnet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeSettings {
    pub advisory_ttl_secs: u64,
    pub error_ttl_secs: u64,
}

impl Default for NoticeSettings {
    fn default() -> Self {
        Self {
            advisory_ttl_secs: 3,
            error_ttl_secs: 10,
        }
    }
}

impl NoticeSettings {
    pub fn advisory_ttl(&self) -> Duration {
        Duration::from_secs(self.advisory_ttl_secs)
    }

    pub fn error_ttl(&self) -> Duration {
        Duration::from_secs(self.error_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub domain: Domain,
    /// Explicit ritual; falls back to the domain's default when unset.
    pub ritual_id: Option<u32>,
    /// Chain the wallet must be connected to.
    pub expected_chain_id: u64,
    /// Porter endpoint; the SDK's default for the domain when unset.
    pub porter_url: Option<String>,
    pub notices: NoticeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            ritual_id: None,
            expected_chain_id: POLYGON_AMOY,
            porter_url: None,
            notices: NoticeSettings::default(),
        }
    }
}

impl Settings {
    /// Reads a TOML file, applies environment overrides and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_toml(&text)?.with_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        info!(
            domain = settings.domain.as_str(),
            ritual_id = settings.ritual_id(),
            expected_chain_id = settings.expected_chain_id,
            "loaded settings"
        );
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies overrides looked up by variable name.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(ENV_DOMAIN) {
            let domain = Domain::from_name(&raw).ok_or(ConfigError::InvalidOverride {
                key: ENV_DOMAIN,
                value: raw.clone(),
            })?;
            self = self.with_domain(domain);
        }
        if let Some(raw) = lookup(ENV_RITUAL_ID) {
            let ritual = raw.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                key: ENV_RITUAL_ID,
                value: raw.clone(),
            })?;
            self.ritual_id = Some(ritual);
        }
        if let Some(raw) = lookup(ENV_EXPECTED_CHAIN_ID) {
            self.expected_chain_id =
                raw.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                    key: ENV_EXPECTED_CHAIN_ID,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = lookup(ENV_PORTER_URL) {
            let url = raw.trim();
            self.porter_url = (!url.is_empty()).then(|| url.to_string());
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_supported_chain(self.expected_chain_id) {
            return Err(ConfigError::UnsupportedChain(self.expected_chain_id));
        }
        Ok(())
    }

    /// Switches domain and resets the ritual to that domain's default.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self.ritual_id = None;
        self
    }

    pub fn ritual_id(&self) -> u32 {
        self.ritual_id
            .unwrap_or_else(|| self.domain.default_ritual_id())
    }
}
