//! # Item Options
//!
//! A named modifier attached to an item ("size: Large", "color: Red").
//!
//! An option is keyed by its `name` inside its item. Anything beyond
//! `name`/`value` is kept verbatim in the residual attribute map and written
//! back out with the record.

use serde_json::Value;

use crate::attributes::{text_field, AttributeRecord, Attributes, FieldAccessor};
use crate::error::{ValidationError, ValidationResult};

/// A named attribute of a line item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemOption {
    name: String,
    value: Value,
    extra: Attributes,
}

static OPTION_FIELDS: &[FieldAccessor<ItemOption>] = &[
    FieldAccessor {
        name: "name",
        get: ItemOption::name_attribute,
        set: ItemOption::set_name_attribute,
    },
    FieldAccessor {
        name: "value",
        get: ItemOption::value_attribute,
        set: ItemOption::set_value_attribute,
    },
];

impl ItemOption {
    /// Creates a validated option from an attribute map.
    ///
    /// ## Example
    /// ```rust
    /// use basket_core::option::ItemOption;
    /// use serde_json::json;
    ///
    /// let attrs = json!({"name": "size", "value": "L", "sku": "TS-L"});
    /// let option = ItemOption::from_attributes(attrs.as_object().unwrap().clone()).unwrap();
    /// assert_eq!(option.name(), "size");
    /// assert_eq!(option.get("sku"), Some(json!("TS-L")));
    /// ```
    pub fn from_attributes(attributes: Attributes) -> ValidationResult<Self> {
        let mut option = ItemOption::default();
        option.fill(attributes)?;
        Ok(option)
    }

    /// Validates `name` and `value`, then assigns every attribute.
    pub fn fill(&mut self, attributes: Attributes) -> ValidationResult<&mut Self> {
        self.fill_from(attributes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Reads any attribute by name.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_attribute(key)
    }

    /// Writes any attribute by name.
    pub fn set(&mut self, key: &str, value: Value) -> ValidationResult<()> {
        self.set_attribute(key, value)
    }

    /// Removes an extra attribute. `name` and `value` are required and
    /// cannot be unset.
    pub fn unset(&mut self, key: &str) -> ValidationResult<()> {
        if Self::REQUIRED.contains(&key) {
            return Err(ValidationError::required(key));
        }
        self.unset_attribute(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.has_attribute(key)
    }

    /// Flat record including extra attributes.
    pub fn to_record(&self) -> Attributes {
        self.record()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    fn name_attribute(&self) -> Option<Value> {
        Some(Value::String(self.name.clone()))
    }

    // Identity is fixed once set; renaming would orphan the key in the item.
    fn set_name_attribute(&mut self, value: Value) -> ValidationResult<()> {
        let name = text_field("name", &value)?;
        if name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        if !self.name.is_empty() && self.name != name {
            return Err(ValidationError::invalid(
                "name",
                format!("option '{}' cannot be renamed", self.name),
            ));
        }
        self.name = name;
        Ok(())
    }

    fn value_attribute(&self) -> Option<Value> {
        Some(self.value.clone())
    }

    fn set_value_attribute(&mut self, value: Value) -> ValidationResult<()> {
        self.value = value;
        Ok(())
    }
}

impl AttributeRecord for ItemOption {
    const REQUIRED: &'static [&'static str] = &["name", "value"];

    fn accessors() -> &'static [FieldAccessor<Self>] {
        OPTION_FIELDS
    }

    fn extra(&self) -> &Attributes {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Attributes {
        &mut self.extra
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
