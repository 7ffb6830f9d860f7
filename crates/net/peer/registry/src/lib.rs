//! In-memory registry of known peer endpoints.
//!
//! The connection manager records every endpoint it is told about or connects
//! to, then asks the registry which ones to dial, advertise or prune. All
//! access goes through a single lock and all records cross by value.

pub mod config;
pub mod registry;

pub use config::{AddressRegistryConfig, ConfigError};
pub use peerbook_net_peer_address::{AddressParseError, AddressRole, PeerAddress};
pub use registry::AddressRegistry;
