//! # basket-store: File-Backed Carts
//!
//! Filesystem persistence and configuration for basket carts.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       basket-store                                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Settings                                   │   │
//! │  │  basket.toml ──► env overrides ──► CartConfig + store dir      │   │
//! │  └───────────────────────────┬─────────────────────────────────────┘   │
//! │                              │                                          │
//! │  ┌───────────────────────────▼─────────────────────────────────────┐   │
//! │  │                      FileStore                                  │   │
//! │  │  impl CartStore: <dir>/<key>.json                               │   │
//! │  └───────────────────────────┬─────────────────────────────────────┘   │
//! │                              │                                          │
//! │  ┌───────────────────────────▼─────────────────────────────────────┐   │
//! │  │              basket_core::Cart<FileStore>                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use basket_store::{open_cart, Settings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load(None)?;
//! let cart = open_cart(&settings)?;
//! println!("{} line(s), total {}", cart.len(), cart.total());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file;
pub mod settings;

pub use error::{OpenError, OpenResult, SettingsError, SettingsResult};
pub use file::FileStore;
pub use settings::{Settings, StorageSettings};

use basket_core::Cart;

/// Opens the cart described by `settings` over a [`FileStore`].
pub fn open_cart(settings: &Settings) -> OpenResult<Cart<FileStore>> {
    let store = FileStore::new(settings.store_dir()?);
    Ok(Cart::load(store, settings.cart.clone())?)
}
