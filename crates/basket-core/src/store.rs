//! # Cart Storage
//!
//! The persistence contract a [`Cart`](crate::cart::Cart) is built on.
//!
//! ## Storage Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storage Boundary                                     │
//! │                                                                         │
//! │  Cart (basket-core)                                                    │
//! │       │                                                                 │
//! │       │  load(key) / store(key, record) / delete(key)                  │
//! │       ▼                                                                 │
//! │  CartStore trait (this module)                                         │
//! │  ├── MemoryStore      (this module, tests and embedding)               │
//! │  └── FileStore        (basket-store, one JSON file per key)            │
//! │                                                                         │
//! │  The record is the whole cart. Writes overwrite: last write wins.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::adjustment::Adjustment;
use crate::attributes::Attributes;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Cart Record
// =============================================================================

/// Serialized cart state, the blob a store keeps under one key.
///
/// ## Wire Format
/// ```json
/// {
///   "discount": "10%",
///   "tax": 0,
///   "items": [
///     {"rowId": "9f1c...", "id": 12, "name": "Tee", "qty": 2, "price": 15,
///      "options": {"size": {"name": "size", "value": "L"}}}
///   ]
/// }
/// ```
///
/// Every field may be absent when decoding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartRecord {
    #[serde(default)]
    pub discount: Adjustment,

    #[serde(default)]
    pub tax: Adjustment,

    #[serde(default)]
    pub items: Vec<Attributes>,
}

impl CartRecord {
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Keyed storage for serialized carts.
///
/// Calls are synchronous; a cart with auto-save enabled blocks on `store`
/// before its mutating operation returns.
pub trait CartStore {
    /// Returns the record stored under `key`, or `None` if never saved.
    fn load(&self, key: &str) -> StoreResult<Option<CartRecord>>;

    /// Stores `record` under `key`, replacing any previous record.
    fn store(&self, key: &str, record: &CartRecord) -> StoreResult<()>;

    /// Removes the record under `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;
}

impl<S: CartStore + ?Sized> CartStore for &S {
    fn load(&self, key: &str) -> StoreResult<Option<CartRecord>> {
        (**self).load(key)
    }

    fn store(&self, key: &str, record: &CartRecord) -> StoreResult<()> {
        (**self).store(key, record)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }
}

impl<S: CartStore + ?Sized> CartStore for Box<S> {
    fn load(&self, key: &str) -> StoreResult<Option<CartRecord>> {
        (**self).load(key)
    }

    fn store(&self, key: &str, record: &CartRecord) -> StoreResult<()> {
        (**self).store(key, record)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }
}

impl<S: CartStore + ?Sized> CartStore for Arc<S> {
    fn load(&self, key: &str) -> StoreResult<Option<CartRecord>> {
        (**self).load(key)
    }

    fn store(&self, key: &str, record: &CartRecord) -> StoreResult<()> {
        (**self).store(key, record)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process store backed by a map.
///
/// Cloning shares the same map, so a test can keep a handle while a cart
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, CartRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the record under `key`.
    pub fn get(&self, key: &str) -> Option<CartRecord> {
        self.records.lock().ok()?.get(key).cloned()
    }

    /// Seeds a record without going through a cart.
    pub fn insert(&self, key: impl Into<String>, record: CartRecord) -> StoreResult<()> {
        self.lock()?.insert(key.into(), record);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records
            .lock()
            .map(|records| records.contains_key(key))
            .unwrap_or(false)
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, CartRecord>>> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl CartStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<CartRecord>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn store(&self, key: &str, record: &CartRecord) -> StoreResult<()> {
        self.lock()?.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_decodes_with_missing_fields() {
        let record = CartRecord::from_json("{}").unwrap();
        assert_eq!(record, CartRecord::default());

        let record = CartRecord::from_json(r#"{"discount": "10%"}"#).unwrap();
        assert_eq!(record.discount, Adjustment::Percent(10.0));
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_record_encodes_wire_shape() {
        let record = CartRecord {
            discount: Adjustment::Percent(10.0),
            tax: Adjustment::Fixed(2.5),
            items: vec![json!({"rowId": "a", "id": 1}).as_object().cloned().unwrap()],
        };

        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"discount": "10%", "tax": 2.5, "items": [{"rowId": "a", "id": 1}]})
        );
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.load("cart").unwrap(), None);

        let record = CartRecord {
            discount: Adjustment::Fixed(5.0),
            ..CartRecord::default()
        };
        store.store("cart", &record).unwrap();
        assert_eq!(store.load("cart").unwrap(), Some(record));

        store.delete("cart").unwrap();
        assert!(!store.contains("cart"));
        store.delete("cart").unwrap();
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.store("k", &CartRecord::default()).unwrap();
        assert!(handle.contains("k"));
    }
}
