//! Mutex-guarded list of known peer endpoints.

use std::collections::HashSet;
use std::time::Duration;

use parking_lot::Mutex;
use peerbook_net_peer_address::{AddressParseError, PeerAddress};
use tracing::{debug, trace};
use web_time::SystemTime;

use crate::config::{AddressRegistryConfig, ConfigError};

/// Registry of every peer endpoint the node knows about.
///
/// Records are unique by (`host`, `port`) and looked up by linear scan; peer
/// counts are bounded by the protocol to tens or low hundreds. Every operation
/// holds the one lock for its full duration, reads included, and no operation
/// re-enters the registry while holding it.
///
/// Records are copied in and copied out. Callers share the registry through
/// an `Arc`.
#[derive(Debug)]
pub struct AddressRegistry {
    addresses: Mutex<Vec<PeerAddress>>,
    active_window: Duration,
}

impl Default for AddressRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::with_active_window(AddressRegistryConfig::default().active_window())
    }

    pub fn with_active_window(active_window: Duration) -> Self {
        Self {
            addresses: Mutex::new(Vec::new()),
            active_window,
        }
    }

    /// Build a registry seeded with the configured manual peers.
    ///
    /// Every peer is validated before anything is inserted; the first bad
    /// entry is reported by name.
    pub fn from_config(config: &AddressRegistryConfig) -> Result<Self, ConfigError> {
        let seeds = config.manual_addresses()?;
        let registry = Self::with_active_window(config.active_window());
        for address in seeds {
            registry.add(address);
        }
        Ok(registry)
    }

    /// Insert `address` unless its endpoint is already known. Never overwrites.
    ///
    /// Returns whether the record was inserted.
    pub fn add(&self, address: PeerAddress) -> bool {
        let mut addresses = self.addresses.lock();
        if addresses.iter().any(|a| a.same_key(&address)) {
            trace!(address = %address, "address already known");
            return false;
        }
        debug!(
            host = %address.host(),
            port = address.port(),
            role = %address.role,
            manual = address.manual,
            "address added"
        );
        addresses.push(address);
        true
    }

    /// Refresh the configuration flags of a known endpoint, or insert it.
    ///
    /// For an existing record only `manual` and `receive` are copied; its
    /// `role` and `last_active` are kept.
    pub fn add_or_update(&self, address: PeerAddress) {
        let mut addresses = self.addresses.lock();
        match addresses.iter_mut().find(|a| a.same_key(&address)) {
            Some(existing) => {
                trace!(
                    address = %address,
                    manual = address.manual,
                    receive = address.receive,
                    "address flags updated"
                );
                existing.manual = address.manual;
                existing.receive = address.receive;
            }
            None => {
                debug!(
                    host = %address.host(),
                    port = address.port(),
                    role = %address.role,
                    manual = address.manual,
                    "address added"
                );
                addresses.push(address);
            }
        }
    }

    /// Record activity for an endpoint.
    ///
    /// The fresh stamp goes through [`Self::add_or_update`], so it only lands
    /// on a newly inserted record. A known endpoint keeps its stored
    /// `last_active`.
    pub fn touch(&self, address: &str) -> Result<(), AddressParseError> {
        let mut parsed = PeerAddress::parse(address)?;
        parsed.mark_active();
        self.add_or_update(parsed);
        Ok(())
    }

    /// Parse and [`Self::add`]. A known endpoint keeps its existing flags,
    /// even when `is_manual` differs.
    pub fn add_from_string(
        &self,
        address: &str,
        is_manual: bool,
    ) -> Result<bool, AddressParseError> {
        let parsed = PeerAddress::parse_with_manual(address, is_manual)?;
        Ok(self.add(parsed))
    }

    /// Parse as a learned endpoint, stamp it active and [`Self::add`] it.
    /// A known endpoint is left untouched.
    pub fn add_active_from_string(&self, address: &str) -> Result<bool, AddressParseError> {
        let mut parsed = PeerAddress::parse_with_manual(address, false)?;
        parsed.mark_active();
        Ok(self.add(parsed))
    }

    /// Insert every endpoint not already known, with the given `manual` flag.
    ///
    /// The whole batch is parsed before the lock is taken; a parse error is
    /// returned without inserting anything. Returns the number inserted.
    pub fn add_many_from_strings<I, S>(
        &self,
        addresses: I,
        is_manual: bool,
    ) -> Result<usize, AddressParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = parse_all(addresses, is_manual)?;

        let mut stored = self.addresses.lock();
        let mut inserted = 0;
        for address in parsed {
            if stored.iter().any(|a| a.same_key(&address)) {
                continue;
            }
            debug!(
                host = %address.host(),
                port = address.port(),
                role = %address.role,
                manual = is_manual,
                "address added"
            );
            stored.push(address);
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Delete the record for `address`'s endpoint. Returns whether one existed.
    pub fn remove(&self, address: &PeerAddress) -> bool {
        let mut addresses = self.addresses.lock();
        remove_locked(&mut addresses, address)
    }

    pub fn remove_from_string(&self, address: &str) -> Result<bool, AddressParseError> {
        let parsed = PeerAddress::parse(address)?;
        Ok(self.remove(&parsed))
    }

    /// Delete every listed endpoint; unknown ones are skipped.
    ///
    /// Parses the whole batch first, like [`Self::add_many_from_strings`].
    /// Returns the number removed.
    pub fn remove_many_from_strings<I, S>(&self, addresses: I) -> Result<usize, AddressParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = parse_all(addresses, false)?;

        let mut stored = self.addresses.lock();
        let mut removed = 0;
        for address in &parsed {
            if remove_locked(&mut stored, address) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Replace a known endpoint's record wholesale. Unknown endpoints are not
    /// inserted. Returns whether a record was replaced.
    pub fn update(&self, address: PeerAddress) -> bool {
        let mut addresses = self.addresses.lock();
        match addresses.iter_mut().find(|a| a.same_key(&address)) {
            Some(existing) => {
                trace!(address = %address, "address replaced");
                *existing = address;
                true
            }
            None => {
                trace!(address = %address, "update for unknown address ignored");
                false
            }
        }
    }

    /// Canonical strings of every record.
    pub fn get_all(&self) -> HashSet<String> {
        self.collect_strings(|_| true)
    }

    /// Copy of the record for `address`'s endpoint, `None` if unknown.
    pub fn get(&self, address: &str) -> Result<Option<PeerAddress>, AddressParseError> {
        let parsed = PeerAddress::parse(address)?;
        let addresses = self.addresses.lock();
        Ok(addresses.iter().find(|a| a.same_key(&parsed)).cloned())
    }

    /// Canonical strings of operator-configured records.
    pub fn get_manual(&self) -> HashSet<String> {
        self.collect_strings(|a| a.manual)
    }

    /// Known endpoints missing from `existing`, e.g. the set a remote reports.
    ///
    /// Plain set difference over one snapshot from [`Self::get_all`] or
    /// [`Self::get_manual`]; the lock is released before comparing.
    pub fn get_diff(&self, existing: &HashSet<String>, manual_only: bool) -> HashSet<String> {
        let known = if manual_only {
            self.get_manual()
        } else {
            self.get_all()
        };
        known.difference(existing).cloned().collect()
    }

    /// Canonical strings of records stamped active within `window` of now.
    ///
    /// Unstamped records never match. With `manual_only` only
    /// operator-configured records are considered.
    pub fn get_active_since(&self, window: Duration, manual_only: bool) -> HashSet<String> {
        let cutoff = SystemTime::now().checked_sub(window);
        self.collect_strings(|a| (!manual_only || a.manual) && a.is_active_since(cutoff))
    }

    /// [`Self::get_active_since`] over the configured active window.
    pub fn get_recently_active(&self, manual_only: bool) -> HashSet<String> {
        self.get_active_since(self.active_window, manual_only)
    }

    pub fn contains(&self, address: &str) -> Result<bool, AddressParseError> {
        let parsed = PeerAddress::parse(address)?;
        let addresses = self.addresses.lock();
        Ok(addresses.iter().any(|a| a.same_key(&parsed)))
    }

    pub fn count(&self) -> usize {
        self.addresses.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Copies of every record, in insertion order.
    pub fn snapshot(&self) -> Vec<PeerAddress> {
        self.addresses.lock().clone()
    }

    pub fn active_window(&self) -> Duration {
        self.active_window
    }

    fn collect_strings(&self, keep: impl Fn(&PeerAddress) -> bool) -> HashSet<String> {
        let addresses = self.addresses.lock();
        let result: HashSet<String> = addresses
            .iter()
            .filter(|&a| keep(a))
            .map(PeerAddress::to_addr_string)
            .collect();
        trace!(total = addresses.len(), selected = result.len(), "address snapshot");
        result
    }
}

fn parse_all<I, S>(addresses: I, is_manual: bool) -> Result<Vec<PeerAddress>, AddressParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    addresses
        .into_iter()
        .map(|s| PeerAddress::parse_with_manual(s.as_ref(), is_manual))
        .collect()
}

fn remove_locked(addresses: &mut Vec<PeerAddress>, address: &PeerAddress) -> bool {
    match addresses.iter().position(|a| a.same_key(address)) {
        Some(pos) => {
            let removed = addresses.remove(pos);
            debug!(host = %removed.host(), port = removed.port(), "address removed");
            true
        }
        None => {
            trace!(address = %address, "remove for unknown address ignored");
            false
        }
    }
}
