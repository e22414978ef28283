//! Inventory snapshots and the inventory collaborator interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use craftline_common::{InventoryResult, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

/// Fixed seeds so equal quantity maps always fingerprint identically.
const FINGERPRINT_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Normal and high quality quantities held for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemQuantity {
    /// Normal-quality units
    pub nq: u32,
    /// High-quality units
    pub hq: u32,
}

impl ItemQuantity {
    /// Creates a quantity pair.
    #[must_use]
    pub const fn new(nq: u32, hq: u32) -> Self {
        Self { nq, hq }
    }

    /// Total units across both pools.
    #[must_use]
    pub const fn total(self) -> u32 {
        self.nq.saturating_add(self.hq)
    }

    /// Returns true when both pools are empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.nq == 0 && self.hq == 0
    }
}

/// Deterministic digest of every quantity in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Wraps a raw digest value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw digest value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Immutable view of a player's item quantities at one point in time.
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    /// Quantities keyed by item, zero entries removed
    items: BTreeMap<ItemId, ItemQuantity>,
    /// Digest over `items`
    fingerprint: Fingerprint,
    /// When the snapshot was taken
    captured_at: DateTime<Utc>,
}

impl InventorySnapshot {
    /// Creates a snapshot builder.
    #[must_use]
    pub fn builder() -> InventorySnapshotBuilder {
        InventorySnapshotBuilder::default()
    }

    /// Creates an empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Returns the quantities held for an item (zero when absent).
    #[must_use]
    pub fn quantity(&self, item: ItemId) -> ItemQuantity {
        self.items.get(&item).copied().unwrap_or_default()
    }

    /// Returns true if the snapshot holds any unit of the item.
    #[must_use]
    pub fn contains(&self, item: ItemId) -> bool {
        self.items.contains_key(&item)
    }

    /// Returns the snapshot fingerprint.
    #[must_use]
    pub const fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Returns the capture timestamp.
    #[must_use]
    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Number of distinct items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Units held across every item and both quality pools.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.items.values().map(|qty| u64::from(qty.total())).sum()
    }

    /// Iterates held items in ascending item order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, ItemQuantity)> + '_ {
        self.items.iter().map(|(&id, &qty)| (id, qty))
    }

    /// Returns a copy of this snapshot with one item's quantities replaced.
    #[must_use]
    pub fn with_quantity(&self, item: ItemId, quantity: ItemQuantity) -> Self {
        InventorySnapshotBuilder {
            items: self.items.clone(),
            captured_at: Some(Utc::now()),
        }
        .set(item, quantity)
        .build()
    }
}

fn fingerprint_of(items: &BTreeMap<ItemId, ItemQuantity>) -> Fingerprint {
    let [k0, k1, k2, k3] = FINGERPRINT_SEEDS;
    let mut hasher = ahash::RandomState::with_seeds(k0, k1, k2, k3).build_hasher();
    items.len().hash(&mut hasher);
    for (item, qty) in items {
        item.raw().hash(&mut hasher);
        qty.nq.hash(&mut hasher);
        qty.hq.hash(&mut hasher);
    }
    Fingerprint(hasher.finish())
}

/// Builder for inventory snapshots.
#[derive(Debug, Default)]
pub struct InventorySnapshotBuilder {
    items: BTreeMap<ItemId, ItemQuantity>,
    captured_at: Option<DateTime<Utc>>,
}

impl InventorySnapshotBuilder {
    /// Adds normal-quality units of an item.
    #[must_use]
    pub fn nq(mut self, item: ItemId, amount: u32) -> Self {
        let entry = self.items.entry(item).or_default();
        entry.nq = entry.nq.saturating_add(amount);
        self
    }

    /// Adds high-quality units of an item.
    #[must_use]
    pub fn hq(mut self, item: ItemId, amount: u32) -> Self {
        let entry = self.items.entry(item).or_default();
        entry.hq = entry.hq.saturating_add(amount);
        self
    }

    /// Adds both pools of an item at once.
    #[must_use]
    pub fn item(self, item: ItemId, nq: u32, hq: u32) -> Self {
        self.nq(item, nq).hq(item, hq)
    }

    /// Replaces the quantities held for an item.
    #[must_use]
    pub fn set(mut self, item: ItemId, quantity: ItemQuantity) -> Self {
        self.items.insert(item, quantity);
        self
    }

    /// Sets the capture timestamp (defaults to now).
    #[must_use]
    pub fn captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }

    /// Builds the snapshot and computes its fingerprint.
    #[must_use]
    pub fn build(mut self) -> InventorySnapshot {
        self.items.retain(|_, qty| !qty.is_empty());
        let fingerprint = fingerprint_of(&self.items);
        InventorySnapshot {
            items: self.items,
            fingerprint,
            captured_at: self.captured_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Options passed to the inventory collaborator when scanning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Include retainer/storage containers, not only the carried bags
    pub include_storage: bool,
    /// Include equipped gear
    pub include_equipped: bool,
}

/// Source of inventory snapshots.
///
/// Acquiring a snapshot is the only asynchronous step of a solve.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Scans the current inventory.
    async fn scan(&self, options: &ScanOptions) -> InventoryResult<InventorySnapshot>;
}

/// Inventory source that always returns the same snapshot.
#[derive(Debug, Clone)]
pub struct StaticInventorySource {
    snapshot: InventorySnapshot,
}

impl StaticInventorySource {
    /// Creates a source serving the given snapshot.
    #[must_use]
    pub const fn new(snapshot: InventorySnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl InventorySource for StaticInventorySource {
    async fn scan(&self, _options: &ScanOptions) -> InventoryResult<InventorySnapshot> {
        Ok(self.snapshot.clone())
    }
}
