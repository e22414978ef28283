//! File-backed inventory source.

use async_trait::async_trait;
use craftline_common::{InventoryError, InventoryResult, ItemId};
use craftline_solver::inventory::{InventorySnapshot, InventorySource, ScanOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Where an inventory row is held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemLocation {
    /// Carried bags
    #[default]
    Bags,
    /// Retainers and storage containers
    Storage,
    /// Currently equipped
    Equipped,
}

impl ItemLocation {
    const fn included(self, options: &ScanOptions) -> bool {
        match self {
            Self::Bags => true,
            Self::Storage => options.include_storage,
            Self::Equipped => options.include_equipped,
        }
    }
}

/// One inventory row. Rows for the same item are summed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemEntry {
    /// Item held
    pub item_id: u32,
    /// Normal-quality units
    #[serde(default)]
    pub nq: u32,
    /// High-quality units
    #[serde(default)]
    pub hq: u32,
    /// Container the units sit in
    #[serde(default)]
    pub location: ItemLocation,
}

/// An inventory file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFile {
    /// Rows in file order
    #[serde(default)]
    pub items: Vec<ItemEntry>,
}

impl InventoryFile {
    /// Builds a snapshot from the rows the scan options include.
    #[must_use]
    pub fn to_snapshot(&self, options: &ScanOptions) -> InventorySnapshot {
        self.items
            .iter()
            .filter(|row| row.location.included(options))
            .fold(InventorySnapshot::builder(), |builder, row| {
                builder.item(ItemId::new(row.item_id), row.nq, row.hq)
            })
            .build()
    }
}

/// Inventory source that re-reads a TOML file on every scan.
#[derive(Debug, Clone)]
pub struct FileInventorySource {
    path: PathBuf,
}

impl FileInventorySource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InventorySource for FileInventorySource {
    async fn scan(&self, options: &ScanOptions) -> InventoryResult<InventorySnapshot> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| InventoryError::Unavailable(format!("{}: {e}", self.path.display())))?;

        let file: InventoryFile =
            toml::from_str(&content).map_err(|e| InventoryError::Malformed(e.to_string()))?;

        let snapshot = file.to_snapshot(options);
        debug!(
            rows = file.items.len(),
            items = snapshot.len(),
            units = snapshot.total_units(),
            fingerprint = %snapshot.fingerprint(),
            "read inventory file"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[[items]]
item_id = 5106
nq = 10

[[items]]
item_id = 5107
hq = 2

[[items]]
item_id = 5106
nq = 30
location = "storage"

[[items]]
item_id = 3001
nq = 1
location = "equipped"
"#;

    #[tokio::test]
    async fn test_scan_respects_locations() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("inventory.toml");
        fs::write(&path, SAMPLE).expect("write");
        let source = FileInventorySource::new(&path);

        let bags = source.scan(&ScanOptions::default()).await.expect("scan");
        assert_eq!(bags.quantity(ItemId::new(5106)).nq, 10);
        assert_eq!(bags.quantity(ItemId::new(5107)).hq, 2);
        assert!(!bags.contains(ItemId::new(3001)));

        let everything = source
            .scan(&ScanOptions {
                include_storage: true,
                include_equipped: true,
            })
            .await
            .expect("scan");
        assert_eq!(everything.quantity(ItemId::new(5106)).nq, 40);
        assert!(everything.total_units() > bags.total_units());
        assert!(everything.contains(ItemId::new(3001)));
        assert_ne!(bags.fingerprint(), everything.fingerprint());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let source = FileInventorySource::new("/nonexistent/inventory.toml");
        let result = source.scan(&ScanOptions::default()).await;
        assert!(matches!(result, Err(InventoryError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("inventory.toml");
        fs::write(&path, "[[items]]\nitem_id = -4\n").expect("write");
        let result = FileInventorySource::new(&path)
            .scan(&ScanOptions::default())
            .await;
        assert!(matches!(result, Err(InventoryError::Malformed(_))));
    }
}
