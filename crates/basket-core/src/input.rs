//! # Cart Inputs
//!
//! The shapes `add`, `update` and `remove` accept.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ItemInput (add / update)          RowSelector (remove)                 │
//! │  ────────────────────────          ────────────────────                 │
//! │  Many(Vec<ItemInput>)              Many(Vec<RowSelector>)               │
//! │  Item(Item)                        Item(Item)                           │
//! │  Attributes(map)                   Attributes(map with "rowId")         │
//! │                                    RowId(String)                        │
//! │                                                                         │
//! │  Dispatched once at the cart boundary; each variant calls one typed     │
//! │  operation. `Many` is applied in order and stops at the first error.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;

use crate::attributes::{text_field, Attributes};
use crate::error::{ValidationError, ValidationResult};
use crate::item::{Item, ROW_ID};

// =============================================================================
// Item Input
// =============================================================================

/// Payload for [`Cart::add`](crate::cart::Cart::add) and
/// [`Cart::update`](crate::cart::Cart::update).
#[derive(Debug, Clone, PartialEq)]
pub enum ItemInput {
    Many(Vec<ItemInput>),
    Item(Item),
    Attributes(Attributes),
}

impl From<Item> for ItemInput {
    fn from(item: Item) -> Self {
        ItemInput::Item(item)
    }
}

impl From<Attributes> for ItemInput {
    fn from(attributes: Attributes) -> Self {
        ItemInput::Attributes(attributes)
    }
}

impl<T: Into<ItemInput>> From<Vec<T>> for ItemInput {
    fn from(inputs: Vec<T>) -> Self {
        ItemInput::Many(inputs.into_iter().map(Into::into).collect())
    }
}

/// Objects become attribute maps, arrays become `Many`.
impl TryFrom<Value> for ItemInput {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(attributes) => Ok(ItemInput::Attributes(attributes)),
            Value::Array(values) => values
                .into_iter()
                .map(ItemInput::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(ItemInput::Many),
            _ => Err(ValidationError::invalid(
                "items",
                "expected an item map or a list of item maps",
            )),
        }
    }
}

// =============================================================================
// Row Selector
// =============================================================================

/// Payload for [`Cart::remove`](crate::cart::Cart::remove).
#[derive(Debug, Clone, PartialEq)]
pub enum RowSelector {
    Many(Vec<RowSelector>),
    Item(Item),
    Attributes(Attributes),
    RowId(String),
}

impl RowSelector {
    /// The row id this selector points at.
    ///
    /// A map without a usable `rowId` (missing, blank or not text) resolves
    /// to an empty id, which never matches. `Many` has no single row id.
    pub fn row_id(&self) -> Option<String> {
        match self {
            RowSelector::Many(_) => None,
            RowSelector::Item(item) => Some(item.row_id().to_string()),
            RowSelector::Attributes(attributes) => {
                Some(row_id_in(attributes).ok().flatten().unwrap_or_default())
            }
            RowSelector::RowId(row_id) => Some(row_id.clone()),
        }
    }
}

impl From<&str> for RowSelector {
    fn from(row_id: &str) -> Self {
        RowSelector::RowId(row_id.to_string())
    }
}

impl From<String> for RowSelector {
    fn from(row_id: String) -> Self {
        RowSelector::RowId(row_id)
    }
}

impl From<Item> for RowSelector {
    fn from(item: Item) -> Self {
        RowSelector::Item(item)
    }
}

impl From<&Item> for RowSelector {
    fn from(item: &Item) -> Self {
        RowSelector::RowId(item.row_id().to_string())
    }
}

impl From<Attributes> for RowSelector {
    fn from(attributes: Attributes) -> Self {
        RowSelector::Attributes(attributes)
    }
}

impl<T: Into<RowSelector>> From<Vec<T>> for RowSelector {
    fn from(selectors: Vec<T>) -> Self {
        RowSelector::Many(selectors.into_iter().map(Into::into).collect())
    }
}

/// Strings and numbers are row ids, objects are attribute maps, arrays
/// become `Many`.
impl TryFrom<Value> for RowSelector {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(row_id) => Ok(RowSelector::RowId(row_id)),
            Value::Number(n) => Ok(RowSelector::RowId(n.to_string())),
            Value::Object(attributes) => Ok(RowSelector::Attributes(attributes)),
            Value::Array(values) => values
                .into_iter()
                .map(RowSelector::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(RowSelector::Many),
            _ => Err(ValidationError::invalid(
                ROW_ID,
                "expected a row id, an item map or a list of them",
            )),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Non-empty `rowId` of an attribute map.
///
/// Missing, null and blank ids are `None`. Arrays, maps and other non-text
/// values fail with `InvalidFormat`.
pub(crate) fn row_id_in(attributes: &Attributes) -> ValidationResult<Option<String>> {
    let row_id = match attributes.get(ROW_ID) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => text_field(ROW_ID, value)?,
    };

    Ok(Some(row_id).filter(|row_id| !row_id.trim().is_empty()))
}
