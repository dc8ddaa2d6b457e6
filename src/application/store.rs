//! # Auction Store
//!
//! Volatile, in-memory implementation of `AuctionStore`.
//! A restart loses every open auction.

use std::collections::HashMap;

use crate::domain::traits::AuctionStore;
use crate::domain::types::{AuctionError, AuctionRecord};

#[derive(Debug, Default)]
pub struct InMemoryAuctionStore {
    records: HashMap<String, AuctionRecord>,
    /// Announcement IDs in creation order.
    order: Vec<String>,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuctionStore for InMemoryAuctionStore {
    fn create(&mut self, record: AuctionRecord) -> Result<(), AuctionError> {
        if self.records.contains_key(&record.announcement_id) {
            return Err(AuctionError::AlreadyExists(record.announcement_id));
        }
        self.order.push(record.announcement_id.clone());
        self.records.insert(record.announcement_id.clone(), record);
        Ok(())
    }

    fn get(&self, announcement_id: &str) -> Option<&AuctionRecord> {
        self.records.get(announcement_id)
    }

    fn get_mut(&mut self, announcement_id: &str) -> Option<&mut AuctionRecord> {
        self.records.get_mut(announcement_id)
    }

    fn delete(&mut self, announcement_id: &str) -> Result<AuctionRecord, AuctionError> {
        let record = self
            .records
            .remove(announcement_id)
            .ok_or_else(|| AuctionError::NotFound(announcement_id.to_string()))?;
        self.order.retain(|id| id != announcement_id);
        Ok(record)
    }

    fn list(&self) -> Vec<&AuctionRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> AuctionRecord {
        AuctionRecord::new(
            id.to_string(),
            "!room".to_string(),
            "?".to_string(),
            format!("Item {id}"),
            None,
        )
    }

    #[test]
    fn test_create_refuses_duplicates() {
        let mut store = InMemoryAuctionStore::new();
        store.create(record("$a")).unwrap();

        let mut dup = record("$a");
        dup.item_description = "Other".to_string();
        assert_eq!(
            store.create(dup),
            Err(AuctionError::AlreadyExists("$a".to_string()))
        );
        assert_eq!(store.get("$a").unwrap().item_description, "Item $a");
    }

    #[test]
    fn test_list_preserves_creation_order() {
        let mut store = InMemoryAuctionStore::new();
        for id in ["$c", "$a", "$b"] {
            store.create(record(id)).unwrap();
        }
        store.delete("$a").unwrap();

        let ids: Vec<_> = store
            .list()
            .iter()
            .map(|r| r.announcement_id.as_str())
            .collect();
        assert_eq!(ids, vec!["$c", "$b"]);
    }

    #[test]
    fn test_delete_twice_reports_not_found() {
        let mut store = InMemoryAuctionStore::new();
        store.create(record("$a")).unwrap();

        assert_eq!(store.delete("$a").unwrap().announcement_id, "$a");
        assert!(store.get("$a").is_none());
        assert_eq!(
            store.delete("$a").unwrap_err(),
            AuctionError::NotFound("$a".to_string())
        );
    }
}
