//! The peer endpoint record and its canonical string form.
//!
//! Addresses are written as `host:port[:role]`. IPv6 hosts are bracketed
//! (`[::1]:9876`) and stored without the brackets.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::error::AddressParseError;
use crate::role::AddressRole;

/// One known peer endpoint.
///
/// Identity is the (`host`, `port`) pair, see [`PeerAddress::same_key`].
/// The derived `PartialEq` compares every field and is meant for comparing
/// copies, not for deciding whether two records name the same endpoint.
///
/// The host is checked on every way in ([`PeerAddress::try_new`], parsing,
/// deserializing), so the canonical string of any record parses back to the
/// same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PeerAddressRecord")]
pub struct PeerAddress {
    host: String,
    port: u16,
    pub role: AddressRole,
    /// Operator-configured seed rather than learned through peer exchange.
    pub manual: bool,
    /// Caller-owned eligibility flag; stored and copied, never interpreted.
    pub receive: bool,
    /// `None` until the endpoint is observed active.
    pub last_active: Option<SystemTime>,
}

/// Unchecked serde shape of [`PeerAddress`].
#[derive(Deserialize)]
struct PeerAddressRecord {
    host: String,
    port: u16,
    #[serde(default)]
    role: AddressRole,
    #[serde(default)]
    manual: bool,
    #[serde(default)]
    receive: bool,
    #[serde(default)]
    last_active: Option<SystemTime>,
}

impl TryFrom<PeerAddressRecord> for PeerAddress {
    type Error = AddressParseError;

    fn try_from(record: PeerAddressRecord) -> Result<Self, Self::Error> {
        let mut address = Self::try_new(record.host, record.port)?;
        address.role = record.role;
        address.manual = record.manual;
        address.receive = record.receive;
        address.last_active = record.last_active;
        Ok(address)
    }
}

impl PeerAddress {
    /// Record for `host:port` with the default role and no flags set.
    ///
    /// Rejects hosts the string form cannot carry: empty, padded with
    /// whitespace, or containing `[` or `]`.
    pub fn try_new(host: impl Into<String>, port: u16) -> Result<Self, AddressParseError> {
        let host = host.into();
        validate_host(&host)?;
        Ok(Self::from_parts(host, port))
    }

    fn from_parts(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            role: AddressRole::Full,
            manual: false,
            receive: false,
            last_active: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn with_role(mut self, role: AddressRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_manual(mut self, manual: bool) -> Self {
        self.manual = manual;
        self
    }

    pub fn with_receive(mut self, receive: bool) -> Self {
        self.receive = receive;
        self
    }

    pub fn with_last_active(mut self, at: SystemTime) -> Self {
        self.last_active = Some(at);
        self
    }

    /// Parse `host:port[:role]` with `manual = false`.
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        Self::parse_with_manual(s, false)
    }

    /// Parse `host:port[:role]`, setting `manual`. `receive` is false and
    /// `last_active` unset.
    pub fn parse_with_manual(s: &str, manual: bool) -> Result<Self, AddressParseError> {
        let (host, port, role) = split_address(s)?;
        Ok(Self::from_parts(host.to_owned(), port)
            .with_role(role)
            .with_manual(manual))
    }

    /// Identity key.
    pub fn key(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    /// Whether `other` names the same endpoint (host and port match).
    pub fn same_key(&self, other: &PeerAddress) -> bool {
        self.port == other.port && self.host == other.host
    }

    /// Stamp `last_active` with the current time.
    pub fn mark_active(&mut self) {
        self.last_active = Some(SystemTime::now());
    }

    /// Whether the record was active at or after `cutoff`.
    ///
    /// A `None` cutoff means the window reaches past the start of the clock,
    /// so any stamped record qualifies. Unstamped records never do.
    pub fn is_active_since(&self, cutoff: Option<SystemTime>) -> bool {
        match (self.last_active, cutoff) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(at), Some(cutoff)) => at >= cutoff,
        }
    }

    /// Canonical `host:port[:role]` form.
    pub fn to_addr_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)?;
        } else {
            write!(f, "{}:{}", self.host, self.port)?;
        }
        if let Some(suffix) = self.role.suffix() {
            write!(f, ":{suffix}")?;
        }
        Ok(())
    }
}

impl FromStr for PeerAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split an address string into host, port and role.
fn split_address(s: &str) -> Result<(&str, u16, AddressRole), AddressParseError> {
    let input = s.trim();
    if input.is_empty() {
        return Err(AddressParseError::Empty);
    }

    let (host, tail) = match input.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| AddressParseError::UnclosedBracket(input.to_owned()))?;
            let tail = match after.strip_prefix(':') {
                Some(tail) => tail,
                None if after.is_empty() => {
                    return Err(AddressParseError::MissingPort(input.to_owned()));
                }
                None => return Err(AddressParseError::TrailingSegments(input.to_owned())),
            };
            (host, tail)
        }
        None => {
            if input.matches(':').count() > 2 {
                return Err(if looks_like_ipv6(input) {
                    AddressParseError::UnbracketedIpv6(input.to_owned())
                } else {
                    AddressParseError::TrailingSegments(input.to_owned())
                });
            }
            input
                .split_once(':')
                .ok_or_else(|| AddressParseError::MissingPort(input.to_owned()))?
        }
    };

    validate_host(host)?;

    let (port, role) = match tail.split_once(':') {
        Some((port, suffix)) => {
            if suffix.contains(':') {
                return Err(AddressParseError::TrailingSegments(input.to_owned()));
            }
            let role = AddressRole::from_suffix(suffix)
                .ok_or_else(|| AddressParseError::UnknownRole(suffix.to_owned()))?;
            (port, role)
        }
        None => (tail, AddressRole::Full),
    };

    let port = port
        .parse::<u16>()
        .map_err(|source| AddressParseError::InvalidPort {
            port: port.to_owned(),
            source,
        })?;

    Ok((host, port, role))
}

/// Hosts the string form can reproduce exactly.
fn validate_host(host: &str) -> Result<(), AddressParseError> {
    if host.is_empty() {
        return Err(AddressParseError::EmptyHost);
    }
    if host.trim() != host || host.contains(['[', ']']) {
        return Err(AddressParseError::InvalidHost(host.to_owned()));
    }
    Ok(())
}

/// Bare IPv6 literal, optionally followed by what the caller meant as a port.
fn looks_like_ipv6(input: &str) -> bool {
    input.contains("::")
        || input.parse::<Ipv6Addr>().is_ok()
        || input
            .rsplit_once(':')
            .is_some_and(|(head, _)| head.parse::<Ipv6Addr>().is_ok())
}
