//! Registry configuration.

use std::time::Duration;

use peerbook_net_peer_address::{AddressParseError, PeerAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default window for [`crate::AddressRegistry::get_recently_active`] (10 minutes).
pub const DEFAULT_ACTIVE_WINDOW_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid manual peer `{peer}`: {source}")]
    InvalidPeer {
        peer: String,
        #[source]
        source: AddressParseError,
    },
}

/// Registry settings, usually one section of the node's TOML config.
///
/// ```toml
/// manual_peers = ["10.0.0.1:9876", "seed.example.org:9876:blk"]
/// active_window_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AddressRegistryConfig {
    /// Operator-supplied seeds, inserted with `manual = true`.
    pub manual_peers: Vec<String>,
    /// How far back an activity stamp still counts as recent.
    pub active_window_secs: u64,
}

impl Default for AddressRegistryConfig {
    fn default() -> Self {
        Self {
            manual_peers: Vec::new(),
            active_window_secs: DEFAULT_ACTIVE_WINDOW_SECS,
        }
    }
}

impl AddressRegistryConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every manual peer parses. Reports the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.manual_addresses().map(|_| ())
    }

    /// Manual peers parsed with `manual = true`, in configured order.
    pub fn manual_addresses(&self) -> Result<Vec<PeerAddress>, ConfigError> {
        self.manual_peers
            .iter()
            .map(|peer| {
                PeerAddress::parse_with_manual(peer, true).map_err(|source| {
                    ConfigError::InvalidPeer {
                        peer: peer.clone(),
                        source,
                    }
                })
            })
            .collect()
    }

    pub fn active_window(&self) -> Duration {
        Duration::from_secs(self.active_window_secs)
    }
}
