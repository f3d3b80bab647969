//! # basket-core: Pure Cart Logic
//!
//! A session-scoped shopping cart: line items with options, per-item and
//! cart-level discounts and taxes, and persistence through a pluggable store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        basket Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host (web app, CLI, tests)                   │   │
//! │  │        add ──► update ──► remove ──► total ──► save            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ basket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │   item    │  │  option   │  │ adjustment│  │   │
//! │  │   │   Cart    │  │   Item    │  │ ItemOption│  │ Fixed / % │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO FILES • NO NETWORK • STORAGE ONLY THROUGH CartStore       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartStore                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        MemoryStore (here)   /   FileStore (basket-store)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - The cart aggregate, totals and persistence
//! - [`item`] - Line items and their pricing
//! - [`option`] - Named item options (size, color, ...)
//! - [`adjustment`] - Fixed or percentage discount/tax values
//! - [`attributes`] - Open attribute maps and the field-accessor machinery
//! - [`input`] - Accepted shapes for add/update/remove
//! - [`store`] - The storage trait, cart record and in-memory store
//! - [`config`] - Cart construction settings
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use basket_core::{Cart, CartConfig, MemoryStore};
//! use serde_json::json;
//!
//! let mut cart = Cart::load(MemoryStore::new(), CartConfig::default()).unwrap();
//!
//! let item = json!({"id": 7, "name": "Notebook", "qty": 3, "price": 4.5});
//! cart.add(item.as_object().unwrap().clone()).unwrap();
//!
//! assert_eq!(cart.total_qty(), 3.0);
//! assert_eq!(cart.total(), 13.5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adjustment;
pub mod attributes;
pub mod cart;
pub mod config;
pub mod error;
pub mod input;
pub mod item;
pub mod option;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use adjustment::Adjustment;
pub use attributes::{AttributeRecord, Attributes};
pub use cart::Cart;
pub use config::{CartConfig, DEFAULT_STORAGE_KEY};
pub use error::{
    CartError, CartResult, StoreError, StoreResult, ValidationError, ValidationResult,
};
pub use input::{ItemInput, RowSelector};
pub use item::{Item, ROW_ID};
pub use option::ItemOption;
pub use store::{CartRecord, CartStore, MemoryStore};
