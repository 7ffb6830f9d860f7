//! Endpoint roles and their string suffixes.

use serde::{Deserialize, Serialize};

/// How an endpoint is used or was learned.
///
/// The registry never interprets the role; it is carried per record and
/// encoded as the optional third segment of the address string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(strum::Display, strum::IntoStaticStr)] // "full", "trx", "blk", "listen"
#[derive(strum::EnumString)] // FromStr
#[derive(strum::EnumIter)] // AddressRole::iter
#[serde(rename_all = "snake_case")]
pub enum AddressRole {
    /// Blocks and transactions. Encoded without a suffix.
    #[default]
    #[strum(serialize = "full")]
    Full,
    /// Transaction relay only.
    #[strum(serialize = "trx")]
    Transactions,
    /// Block relay only.
    #[strum(serialize = "blk")]
    Blocks,
    /// Listen endpoint advertised by a peer.
    #[strum(serialize = "listen")]
    Listen,
}

impl AddressRole {
    /// Suffix written after the port, `None` for [`AddressRole::Full`].
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Full => None,
            other => Some(other.into()),
        }
    }

    /// Parse an address suffix. `full` is not a suffix: that role is spelled
    /// by leaving the segment out.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.parse::<Self>() {
            Ok(Self::Full) | Err(_) => None,
            Ok(role) => Some(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_suffix_round_trip() {
        for role in AddressRole::iter() {
            match role.suffix() {
                Some(suffix) => assert_eq!(AddressRole::from_suffix(suffix), Some(role)),
                None => assert_eq!(role, AddressRole::Full),
            }
        }
    }

    #[test]
    fn test_from_suffix_rejects_full_and_unknown() {
        assert_eq!(AddressRole::from_suffix("full"), None);
        assert_eq!(AddressRole::from_suffix(""), None);
        assert_eq!(AddressRole::from_suffix("TRX"), None);
        assert_eq!(AddressRole::from_suffix("both"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AddressRole::Transactions.to_string(), "trx");
        assert_eq!(AddressRole::Full.to_string(), "full");
    }
}
