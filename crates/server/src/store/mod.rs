//! Storage contracts for option values and trusted IP ranges.
//!
//! The section handlers only see these traits. `memory` holds `DashMap`
//! backed implementations, `db` the sea-orm ones.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::net::IpAddr;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::network::IpNet;

pub mod db;
pub mod memory;

pub use db::{DbOptionStore, DbTrustedIpStore};
pub use memory::{MemoryOptionStore, MemoryTrustedIpStore};

/// Key-value store of named string settings. Last write wins.
#[async_trait]
pub trait OptionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`. Returns `Ok(false)` when the stored value
    /// already equals `value` and nothing was written.
    async fn update(&self, key: &str, value: &str) -> Result<bool, StoreError>;
}

/// Datastore of trusted ranges keyed by [`TrustedIp::cache_key`].
#[async_trait]
pub trait TrustedIpStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns `Ok(false)` if the datastore refused the entry.
    async fn add(&self, key: &str, entry: &TrustedIp) -> Result<bool, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All entries ordered by `added_at`, then key.
    async fn get_all(&self) -> Result<Vec<(String, TrustedIp)>, StoreError>;
}

/// Network info for a trusted address or range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustedIp {
    /// Network address of the range, in canonical text form.
    pub remote_addr: String,
    pub cidr_range: u8,
    /// `remote_addr/cidr_range`
    pub cidr_format: String,
    pub added_at: OffsetDateTime,
}

impl TrustedIp {
    pub fn from_net(net: &IpNet, added_at: OffsetDateTime) -> Self {
        let network = net.network();
        TrustedIp {
            remote_addr: network.to_string(),
            cidr_range: net.prefix,
            cidr_format: format!("{network}/{}", net.prefix),
            added_at,
        }
    }

    /// Datastore key: hex SHA-256 of the normalized remote address.
    pub fn cache_key(&self) -> String {
        format!("{:x}", Sha256::digest(self.remote_addr.as_bytes()))
    }

    pub fn is_host_only(&self) -> bool {
        self.net().is_some_and(|n| n.is_host())
    }

    pub fn net(&self) -> Option<IpNet> {
        let addr: IpAddr = self.remote_addr.parse().ok()?;
        Some(IpNet {
            addr,
            prefix: self.cidr_range,
        })
    }
}

/// Whether `addr` falls inside any trusted range.
#[tracing::instrument(skip(store))]
pub async fn is_trusted(store: &dyn TrustedIpStore, addr: IpAddr) -> Result<bool, StoreError> {
    let entries = store.get_all().await?;
    Ok(entries
        .iter()
        .filter_map(|(_, entry)| entry.net())
        .any(|net| net.contains(&addr)))
}

pub(crate) fn sort_entries(entries: &mut [(String, TrustedIp)]) {
    entries.sort_by(|(ka, a), (kb, b)| a.added_at.cmp(&b.added_at).then_with(|| ka.cmp(kb)));
}
