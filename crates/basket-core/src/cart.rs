//! # Cart
//!
//! The shopping cart: an insertion-ordered set of line items keyed by row id,
//! plus cart-level discount and tax.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Host Action              Cart Method             State Change          │
//! │  ───────────              ───────────             ────────────          │
//! │                                                                         │
//! │  New request ────────────► Cart::load() ────────► replay stored items  │
//! │                                                                         │
//! │  Add product ────────────► add() ───────────────► items.push(item)     │
//! │                             └─ DuplicateRow if rowId already used       │
//! │                                                                         │
//! │  Edit line ──────────────► update() ────────────► item.fill(attrs)     │
//! │                             └─ NotFound if rowId unknown                │
//! │                                                                         │
//! │  Remove line ────────────► remove() ────────────► items.remove(i)      │
//! │                             └─ NotFound if rowId unknown                │
//! │                                                                         │
//! │  Coupon ─────────────────► set_discount() ──────► discount = value     │
//! │                                                                         │
//! │  Logout ─────────────────► destroy() ───────────► store.delete(key)    │
//! │                                                                         │
//! │  With auto-save on, every state change ends with save().               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Totals
//! ```text
//! total_price(true)  = Σ item prices − discount.raw()        (flat, "10%" → 10)
//! total()            = Σ item prices − discount.amount(Σ)    (percentage-aware)
//!                                    + tax.amount(Σ)
//! ```
//! They agree only when the discount is not a percentage. Both are kept
//! because hosts may depend on either.
//!
//! ## Example
//! ```rust
//! use basket_core::{Cart, CartConfig, MemoryStore};
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! let mut cart = Cart::load(&store, CartConfig::new("session-42", true)).unwrap();
//!
//! let shirt = json!({"id": 1, "name": "Shirt", "qty": 2, "price": 50});
//! cart.add(shirt.as_object().unwrap().clone()).unwrap();
//! cart.set_discount("10%").unwrap();
//!
//! assert_eq!(cart.total(), 90.0);
//! assert!(store.contains("session-42"));
//! ```

use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adjustment::Adjustment;
use crate::attributes::Attributes;
use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::input::{row_id_in, ItemInput, RowSelector};
use crate::item::{Item, ROW_ID};
use crate::store::{CartRecord, CartStore};

/// A shopping cart over a [`CartStore`].
///
/// ## Invariants
/// - Row ids are unique within the cart
/// - Items keep insertion order (totals and records are deterministic)
/// - Cart-level discount/tax apply once to the aggregate, never per item
#[derive(Debug)]
pub struct Cart<S: CartStore> {
    store: S,
    storage_key: String,
    auto_save: bool,
    items: Vec<Item>,
    discount: Adjustment,
    tax: Adjustment,
}

impl<S: CartStore> Cart<S> {
    /// Builds a cart from whatever `store` holds under the configured key.
    ///
    /// Stored items are replayed through [`add`](Self::add) with auto-save
    /// off; the configured auto-save flag is applied afterwards.
    pub fn load(store: S, config: CartConfig) -> CartResult<Self> {
        config.validate()?;

        let mut cart = Cart {
            store,
            storage_key: config.storage_key,
            auto_save: false,
            items: Vec::new(),
            discount: Adjustment::zero(),
            tax: Adjustment::zero(),
        };

        // Replay the stored record, if any
        if let Some(record) = cart.store.load(&cart.storage_key)? {
            cart.discount = record.discount;
            cart.tax = record.tax;

            let count = record.items.len();
            cart.add(record.items)?;
            info!(key = %cart.storage_key, items = count, "Restored cart from storage");
        } else {
            debug!(key = %cart.storage_key, "No stored cart, starting empty");
        }

        // Loading must not write back, so auto-save goes on last
        cart.set_auto_save(config.auto_save);
        Ok(cart)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one item, an item built from attributes, or a list of either.
    ///
    /// ## Behavior
    /// - Attributes without `rowId` get a fresh random one
    /// - An explicit `rowId` (or an `Item`'s row id) already in the cart
    ///   fails with `DuplicateRow`
    /// - A list is applied in order and stops at the first error, keeping
    ///   the elements already added
    /// - If auto-save fails, the failing element is taken back out and the
    ///   error is returned as `Storage`
    pub fn add(&mut self, input: impl Into<ItemInput>) -> CartResult<&mut Self> {
        match input.into() {
            ItemInput::Many(inputs) => {
                for input in inputs {
                    self.add(input)?;
                }
            }
            ItemInput::Item(item) => self.insert_item(item)?,
            ItemInput::Attributes(attributes) => self.insert_attributes(attributes)?,
        }
        Ok(self)
    }

    /// Updates existing items.
    ///
    /// ## Behavior
    /// - `Item`: replaces the stored item with the same row id
    /// - Attributes: merged into the stored item via `fill`, which validates
    ///   the whole map; a partial map missing required fields fails
    /// - Unknown or missing row id fails with `NotFound`
    /// - If auto-save fails, the item is restored to its previous state
    pub fn update(&mut self, input: impl Into<ItemInput>) -> CartResult<&mut Self> {
        match input.into() {
            ItemInput::Many(inputs) => {
                for input in inputs {
                    self.update(input)?;
                }
            }
            ItemInput::Item(item) => self.replace_item(item)?,
            ItemInput::Attributes(attributes) => self.merge_attributes(attributes)?,
        }
        Ok(self)
    }

    /// Removes items by row id, item, attribute map, or a list of those.
    ///
    /// If auto-save fails, the item is put back at its old position.
    pub fn remove(&mut self, selector: impl Into<RowSelector>) -> CartResult<&mut Self> {
        let selector = selector.into();
        match selector.row_id() {
            Some(row_id) => self.remove_row(&row_id)?,
            None => {
                if let RowSelector::Many(selectors) = selector {
                    for selector in selectors {
                        self.remove(selector)?;
                    }
                }
            }
        }
        Ok(self)
    }

    /// Runs `f` on one item, then auto-saves.
    ///
    /// This is how an item signals "I changed" without holding a reference
    /// back to its cart. The row id is the cart's key and is restored if
    /// `f` changes it.
    pub fn with_item_mut<F, R>(&mut self, row_id: &str, f: F) -> CartResult<R>
    where
        F: FnOnce(&mut Item) -> R,
    {
        let index = self.position(row_id).ok_or_else(|| CartError::not_found(row_id))?;
        let previous = self.items[index].clone();

        let result = f(&mut self.items[index]);

        // Row id is the cart's key
        let item = &mut self.items[index];
        if item.row_id() != row_id {
            item.set_row_id(row_id);
        }

        debug!(row_id = %row_id, "Item modified in place");
        self.persist_or(|cart| cart.items[index] = previous)?;
        Ok(result)
    }

    /// Sets the cart discount. Text without `%` is read as a fixed amount.
    pub fn set_discount(&mut self, value: impl Into<Adjustment>) -> CartResult<()> {
        let previous = std::mem::replace(&mut self.discount, value.into());
        debug!(discount = %self.discount, "Cart discount set");
        self.persist_or(|cart| cart.discount = previous)
    }

    /// Sets the cart tax. Text without `%` is read as a fixed amount.
    pub fn set_tax(&mut self, value: impl Into<Adjustment>) -> CartResult<()> {
        let previous = std::mem::replace(&mut self.tax, value.into());
        debug!(tax = %self.tax, "Cart tax set");
        self.persist_or(|cart| cart.tax = previous)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Item with `row_id`, or `None`.
    pub fn item(&self, row_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.row_id() == row_id)
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Number of lines (not quantity).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn discount(&self) -> Adjustment {
        self.discount
    }

    pub fn tax(&self) -> Adjustment {
        self.tax
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Sum of item prices, minus the raw discount number when
    /// `with_discount` is set.
    ///
    /// The discount is NOT percentage-aware here: `"10%"` subtracts 10.
    pub fn total_price(&self, with_discount: bool) -> f64 {
        let mut total: f64 = self.items.iter().map(Item::calculate_price).sum();

        if with_discount && !self.discount.is_zero() {
            total -= self.discount.raw();
        }

        total
    }

    /// Sum of item prices, minus the discount, plus the tax.
    ///
    /// Percentages are taken of the undiscounted item sum.
    pub fn total(&self) -> f64 {
        let subtotal = self.total_price(false);
        let mut total = subtotal;

        if !self.discount.is_zero() {
            total -= self.discount.amount(subtotal);
        }

        if !self.tax.is_zero() {
            total += self.tax.amount(subtotal);
        }

        total
    }

    /// Amount of `value` with percentages taken of the undiscounted item sum.
    pub fn calculate_percentual_or_fixed(&self, value: &Adjustment) -> f64 {
        value.amount(self.total_price(false))
    }

    /// Sum of quantities across all lines.
    pub fn total_qty(&self) -> f64 {
        self.items.iter().map(Item::qty).sum()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn set_auto_save(&mut self, auto_save: bool) -> &mut Self {
        self.auto_save = auto_save;
        self
    }

    pub fn is_auto_save(&self) -> bool {
        self.auto_save
    }

    /// Writes the whole cart under the storage key.
    pub fn save(&self) -> CartResult<()> {
        self.store.store(&self.storage_key, &self.to_record())?;
        debug!(key = %self.storage_key, items = self.items.len(), "Cart saved");
        Ok(())
    }

    /// Deletes the stored record. The in-memory items are left as they are.
    pub fn destroy(&self) -> CartResult<()> {
        self.store.delete(&self.storage_key)?;
        debug!(key = %self.storage_key, "Stored cart deleted");
        Ok(())
    }

    /// Empties the cart (items, discount, tax) and deletes the stored record.
    pub fn clear(&mut self) -> CartResult<()> {
        self.items.clear();
        self.discount = Adjustment::zero();
        self.tax = Adjustment::zero();
        self.destroy()
    }

    pub fn to_record(&self) -> CartRecord {
        CartRecord {
            discount: self.discount,
            tax: self.tax,
            items: self.items.iter().map(Item::to_record).collect(),
        }
    }

    pub fn to_json(&self) -> CartResult<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn position(&self, row_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.row_id() == row_id)
    }

    fn contains(&self, row_id: &str) -> bool {
        self.position(row_id).is_some()
    }

    fn create_row_id(&self) -> String {
        loop {
            let row_id = Uuid::new_v4().simple().to_string();
            if !self.contains(&row_id) {
                return row_id;
            }
        }
    }

    /// Auto-saves; on a store failure runs `rollback` so memory matches
    /// what was last persisted.
    fn persist_or<F>(&mut self, rollback: F) -> CartResult<()>
    where
        F: FnOnce(&mut Self),
    {
        if !self.auto_save {
            return Ok(());
        }

        if let Err(e) = self.save() {
            warn!(key = %self.storage_key, error = %e, "Auto-save failed, change rolled back");
            rollback(self);
            return Err(e);
        }
        Ok(())
    }

    fn insert_item(&mut self, mut item: Item) -> CartResult<()> {
        // Assign a row id if the item has none
        if item.row_id().is_empty() {
            let row_id = self.create_row_id();
            item.set_row_id(row_id);
        } else if self.contains(item.row_id()) {
            return Err(CartError::duplicate(item.row_id()));
        }

        debug!(row_id = %item.row_id(), name = %item.name(), "Item added");
        self.items.push(item);
        self.persist_or(|cart| {
            cart.items.pop();
        })
    }

    fn insert_attributes(&mut self, mut attributes: Attributes) -> CartResult<()> {
        // A rowId that is present but not text is rejected, not replaced
        match row_id_in(&attributes)? {
            Some(row_id) if self.contains(&row_id) => {
                return Err(CartError::duplicate(row_id));
            }
            Some(_) => {}
            None => {
                let row_id = self.create_row_id();
                attributes.insert(ROW_ID.to_string(), Value::String(row_id));
            }
        }

        let item = Item::from_attributes(attributes)?;
        debug!(row_id = %item.row_id(), name = %item.name(), "Item added");
        self.items.push(item);
        self.persist_or(|cart| {
            cart.items.pop();
        })
    }

    fn replace_item(&mut self, item: Item) -> CartResult<()> {
        let index = self
            .position(item.row_id())
            .ok_or_else(|| CartError::not_found(item.row_id()))?;

        debug!(row_id = %item.row_id(), "Item replaced");
        let previous = std::mem::replace(&mut self.items[index], item);
        self.persist_or(|cart| cart.items[index] = previous)
    }

    fn merge_attributes(&mut self, attributes: Attributes) -> CartResult<()> {
        let row_id = row_id_in(&attributes)?.unwrap_or_default();
        let index = self
            .position(&row_id)
            .ok_or_else(|| CartError::not_found(row_id.as_str()))?;

        // fill() is all-or-nothing, so only the save can need undoing
        let previous = self.items[index].clone();
        self.items[index].fill(attributes)?;
        debug!(row_id = %row_id, "Item updated");
        self.persist_or(|cart| cart.items[index] = previous)
    }

    fn remove_row(&mut self, row_id: &str) -> CartResult<()> {
        let index = self
            .position(row_id)
            .ok_or_else(|| CartError::not_found(row_id))?;

        let removed = self.items.remove(index);
        debug!(row_id = %row_id, "Item removed");
        self.persist_or(|cart| cart.items.insert(index, removed))
    }
}

/// Renders the cart record as JSON text.
impl<S: CartStore> fmt::Display for Cart<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
