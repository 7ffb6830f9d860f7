//! Peer endpoint records for the connection manager's address registry.
//!
//! - [`PeerAddress`] - one known endpoint plus its per-record flags
//! - [`AddressRole`] - how the endpoint is used, carried as an optional string suffix
//! - [`AddressParseError`] - rejection reasons for malformed `host:port[:role]` strings

mod address;
mod error;
mod role;

pub use address::PeerAddress;
pub use error::AddressParseError;
pub use role::AddressRole;
