//! # Line Items
//!
//! A cart line: product id, name, quantity and unit price, with optional
//! discount/tax and a set of named options.
//!
//! ## Price Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item: price 200, qty 3, discount "10%", tax 5                          │
//! │                                                                         │
//! │  price × qty                     200 × 3          = 600                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  − discount  (10% of UNIT price)  200 / 100 × 10  =  20  →  580         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  + tax       (fixed)                              =   5  →  585         │
//! │                                                                         │
//! │  Percentages are taken of the unit price, not of price × qty.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use basket_core::item::Item;
//! use serde_json::json;
//!
//! let attrs = json!({"id": 7, "name": "Shirt", "qty": 2, "price": 25, "tax": "10%"});
//! let item = Item::from_attributes(attrs.as_object().unwrap().clone()).unwrap();
//!
//! assert_eq!(item.calculate_price(), 52.5); // 50 + 10% of 25
//! ```

use serde_json::Value;

use crate::adjustment::{number_value, Adjustment};
use crate::attributes::{number_field, text_field, AttributeRecord, Attributes, FieldAccessor};
use crate::error::{ValidationError, ValidationResult};
use crate::option::ItemOption;

/// Record key holding the row id.
pub const ROW_ID: &str = "rowId";

/// A line item in a cart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    row_id: String,
    id: Value,
    name: String,
    qty: f64,
    price: f64,
    discount: Option<Adjustment>,
    tax: Option<Adjustment>,
    options: Vec<ItemOption>,
    extra: Attributes,
}

static ITEM_FIELDS: &[FieldAccessor<Item>] = &[
    FieldAccessor {
        name: ROW_ID,
        get: Item::row_id_attribute,
        set: Item::set_row_id_attribute,
    },
    FieldAccessor {
        name: "id",
        get: Item::id_attribute,
        set: Item::set_id_attribute,
    },
    FieldAccessor {
        name: "name",
        get: Item::name_attribute,
        set: Item::set_name_attribute,
    },
    FieldAccessor {
        name: "qty",
        get: Item::qty_attribute,
        set: Item::set_qty_attribute,
    },
    FieldAccessor {
        name: "price",
        get: Item::price_attribute,
        set: Item::set_price_attribute,
    },
    FieldAccessor {
        name: "discount",
        get: Item::discount_attribute,
        set: Item::set_discount_attribute,
    },
    FieldAccessor {
        name: "tax",
        get: Item::tax_attribute,
        set: Item::set_tax_attribute,
    },
    FieldAccessor {
        name: "options",
        get: Item::options_attribute,
        set: Item::set_options_attribute,
    },
];

impl Item {
    /// Creates a validated item from an attribute map.
    ///
    /// `rowId` is optional here; the cart assigns one when the item is added.
    pub fn from_attributes(attributes: Attributes) -> ValidationResult<Self> {
        let mut item = Item::default();
        item.fill(attributes)?;
        Ok(item)
    }

    /// Validates `id`, `name`, `qty` and `price`, then assigns every attribute.
    ///
    /// The whole map is validated, so a partial map (say, only `qty`) fails
    /// even when the item already has the other fields.
    pub fn fill(&mut self, attributes: Attributes) -> ValidationResult<&mut Self> {
        self.fill_from(attributes)
    }

    // =========================================================================
    // Typed Readers
    // =========================================================================

    pub fn row_id(&self) -> &str {
        &self.row_id
    }

    pub fn id(&self) -> &Value {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qty(&self) -> f64 {
        self.qty
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn discount(&self) -> Option<Adjustment> {
        self.discount
    }

    pub fn tax(&self) -> Option<Adjustment> {
        self.tax
    }

    pub(crate) fn set_row_id(&mut self, row_id: impl Into<String>) {
        self.row_id = row_id.into();
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Replaces or adds each option in `options`.
    pub fn set_options<I>(&mut self, options: I) -> ValidationResult<()>
    where
        I: IntoIterator<Item = Attributes>,
    {
        for attributes in options {
            self.set_option(attributes)?;
        }
        Ok(())
    }

    /// Adds an option keyed by its name.
    ///
    /// An option with the same name is overwritten in place (last write
    /// wins, no duplicate error).
    pub fn set_option(&mut self, attributes: Attributes) -> ValidationResult<&ItemOption> {
        let option = ItemOption::from_attributes(attributes)?;

        let index = match self.options.iter().position(|o| o.name() == option.name()) {
            Some(index) => {
                self.options[index] = option;
                index
            }
            None => {
                self.options.push(option);
                self.options.len() - 1
            }
        };

        Ok(&self.options[index])
    }

    pub fn options(&self) -> &[ItemOption] {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&ItemOption> {
        self.options.iter().find(|o| o.name() == name)
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// `price × qty`, minus the discount, plus the tax.
    pub fn calculate_price(&self) -> f64 {
        let mut total = self.price * self.qty;

        if let Some(discount) = &self.discount {
            total -= self.calculate_percentual_or_fixed(discount);
        }

        if let Some(tax) = &self.tax {
            total += self.calculate_percentual_or_fixed(tax);
        }

        total
    }

    /// Amount of `value`, with percentages taken of the unit price.
    ///
    /// ## Example
    /// ```rust
    /// use basket_core::adjustment::Adjustment;
    /// use basket_core::item::Item;
    /// use serde_json::json;
    ///
    /// let attrs = json!({"id": 1, "name": "Lamp", "qty": 4, "price": 200});
    /// let item = Item::from_attributes(attrs.as_object().unwrap().clone()).unwrap();
    ///
    /// assert_eq!(item.calculate_percentual_or_fixed(&Adjustment::from("10%")), 20.0);
    /// assert_eq!(item.calculate_percentual_or_fixed(&Adjustment::from("15")), 15.0);
    /// ```
    pub fn calculate_percentual_or_fixed(&self, value: &Adjustment) -> f64 {
        value.amount(self.price)
    }

    // =========================================================================
    // Generic Attribute Access
    // =========================================================================

    /// Reads any attribute by name. Unknown missing keys return `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_attribute(key)
    }

    /// Writes any attribute by name, routing known fields through their
    /// typed setters.
    pub fn set(&mut self, key: &str, value: Value) -> ValidationResult<()> {
        self.set_attribute(key, value)
    }

    pub fn unset(&mut self, key: &str) -> ValidationResult<()> {
        self.unset_attribute(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.has_attribute(key)
    }

    /// Full record. `options` is a name → option record map, omitted when
    /// the item has no options.
    pub fn to_record(&self) -> Attributes {
        self.record()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_record())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    fn row_id_attribute(&self) -> Option<Value> {
        (!self.row_id.is_empty()).then(|| Value::String(self.row_id.clone()))
    }

    fn set_row_id_attribute(&mut self, value: Value) -> ValidationResult<()> {
        self.row_id = match value {
            Value::Null => String::new(),
            other => text_field(ROW_ID, &other)?,
        };
        Ok(())
    }

    fn id_attribute(&self) -> Option<Value> {
        (!self.id.is_null()).then(|| self.id.clone())
    }

    fn set_id_attribute(&mut self, value: Value) -> ValidationResult<()> {
        self.id = value;
        Ok(())
    }

    fn name_attribute(&self) -> Option<Value> {
        Some(Value::String(self.name.clone()))
    }

    fn set_name_attribute(&mut self, value: Value) -> ValidationResult<()> {
        self.name = text_field("name", &value)?;
        Ok(())
    }

    fn qty_attribute(&self) -> Option<Value> {
        Some(number_value(self.qty))
    }

    fn set_qty_attribute(&mut self, value: Value) -> ValidationResult<()> {
        self.qty = number_field("qty", &value)?;
        Ok(())
    }

    fn price_attribute(&self) -> Option<Value> {
        Some(number_value(self.price))
    }

    fn set_price_attribute(&mut self, value: Value) -> ValidationResult<()> {
        self.price = number_field("price", &value)?;
        Ok(())
    }

    fn discount_attribute(&self) -> Option<Value> {
        self.discount.map(|d| d.to_value())
    }

    fn set_discount_attribute(&mut self, value: Value) -> ValidationResult<()> {
        self.discount = Adjustment::from_value(&value);
        Ok(())
    }

    fn tax_attribute(&self) -> Option<Value> {
        self.tax.map(|t| t.to_value())
    }

    fn set_tax_attribute(&mut self, value: Value) -> ValidationResult<()> {
        self.tax = Adjustment::from_value(&value);
        Ok(())
    }

    fn options_attribute(&self) -> Option<Value> {
        if self.options.is_empty() {
            return None;
        }

        let options = self
            .options
            .iter()
            .map(|o| (o.name().to_string(), Value::Object(o.to_record())))
            .collect();
        Some(Value::Object(options))
    }

    /// Accepts a list of option maps, or a name → option map as written by
    /// `to_record`. Null clears the options.
    fn set_options_attribute(&mut self, value: Value) -> ValidationResult<()> {
        let entries = match value {
            Value::Null => {
                self.options.clear();
                return Ok(());
            }
            Value::Array(entries) => entries,
            Value::Object(map) => map.into_iter().map(|(_, entry)| entry).collect(),
            _ => {
                return Err(ValidationError::invalid(
                    "options",
                    "must be a list or map of options",
                ))
            }
        };

        let options = entries
            .into_iter()
            .map(|entry| match entry {
                Value::Object(attributes) => Ok(attributes),
                _ => Err(ValidationError::invalid("options", "each option must be a map")),
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        self.set_options(options)
    }
}

impl AttributeRecord for Item {
    const REQUIRED: &'static [&'static str] = &["id", "name", "qty", "price"];

    fn accessors() -> &'static [FieldAccessor<Self>] {
        ITEM_FIELDS
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

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn test_item(price: f64, qty: f64) -> Item {
        Item::from_attributes(attrs(json!({
            "id": 1,
            "name": "Coffee Mug",
            "qty": qty,
            "price": price,
        })))
        .unwrap()
    }

    #[test]
    fn test_fill_requires_all_fields() {
        for missing in ["id", "name", "qty", "price"] {
            let mut map = attrs(json!({"id": 1, "name": "Mug", "qty": 1, "price": 5}));
            map.remove(missing);

            let err = Item::from_attributes(map).unwrap_err();
            assert!(
                matches!(err, ValidationError::Required { ref field } if field == missing),
                "expected {} to be required",
                missing
            );
        }
    }

    #[test]
    fn test_fill_rejects_non_numeric_price() {
        let err = Item::from_attributes(attrs(json!({
            "id": 1, "name": "Mug", "qty": 1, "price": "cheap"
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_failed_fill_leaves_item_untouched() {
        let mut item = test_item(10.0, 1.0);
        let result = item.fill(attrs(json!({
            "id": 1, "name": "Renamed", "qty": "lots", "price": 10
        })));

        assert!(result.is_err());
        assert_eq!(item.name(), "Coffee Mug");
    }

    #[test]
    fn test_calculate_price_plain() {
        assert_eq!(test_item(9.5, 4.0).calculate_price(), 38.0);
    }

    #[test]
    fn test_percentual_or_fixed_uses_unit_price() {
        let item = test_item(200.0, 3.0);
        assert_eq!(item.calculate_percentual_or_fixed(&Adjustment::from("10%")), 20.0);
        assert_eq!(item.calculate_percentual_or_fixed(&Adjustment::from("15")), 15.0);
    }

    #[test]
    fn test_calculate_price_with_discount_and_tax() {
        let item = Item::from_attributes(attrs(json!({
            "id": 1, "name": "Lamp", "qty": 3, "price": 200,
            "discount": "10%", "tax": 5
        })))
        .unwrap();

        assert_eq!(item.calculate_price(), 585.0);
    }

    #[test]
    fn test_empty_discount_is_unset() {
        let item = Item::from_attributes(attrs(json!({
            "id": 1, "name": "Lamp", "qty": 1, "price": 100, "discount": "", "tax": null
        })))
        .unwrap();

        assert_eq!(item.discount(), None);
        assert_eq!(item.tax(), None);
        assert_eq!(item.calculate_price(), 100.0);
        assert!(!item.to_record().contains_key("discount"));
    }

    #[test]
    fn test_options_last_write_wins() {
        let mut item = test_item(10.0, 1.0);
        assert!(!item.has_options());

        item.set_option(attrs(json!({"name": "size", "value": "M"}))).unwrap();
        item.set_option(attrs(json!({"name": "color", "value": "red"}))).unwrap();
        item.set_option(attrs(json!({"name": "size", "value": "XL"}))).unwrap();

        assert!(item.has_options());
        assert_eq!(item.options().len(), 2);
        assert_eq!(item.options()[0].name(), "size");
        assert_eq!(item.option("size").unwrap().value(), &json!("XL"));
    }

    #[test]
    fn test_options_from_list_and_map() {
        let from_list = Item::from_attributes(attrs(json!({
            "id": 1, "name": "Tee", "qty": 1, "price": 10,
            "options": [{"name": "size", "value": "S"}]
        })))
        .unwrap();

        let from_map = Item::from_attributes(attrs(json!({
            "id": 1, "name": "Tee", "qty": 1, "price": 10,
            "options": {"size": {"name": "size", "value": "S"}}
        })))
        .unwrap();

        assert_eq!(from_list.options(), from_map.options());
    }

    #[test]
    fn test_invalid_option_fails_fill() {
        let err = Item::from_attributes(attrs(json!({
            "id": 1, "name": "Tee", "qty": 1, "price": 10,
            "options": [{"name": "size"}]
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::Required { ref field } if field == "value"));
    }

    #[test]
    fn test_generic_access_and_extras() {
        let mut item = test_item(10.0, 2.0);

        item.set("sku", json!("MUG-01")).unwrap();
        item.set("qty", json!("5")).unwrap();

        assert_eq!(item.get("sku"), Some(json!("MUG-01")));
        assert_eq!(item.get("qty"), Some(json!(5)));
        assert_eq!(item.qty(), 5.0);
        assert_eq!(item.get("nonexistent"), None);

        item.unset("sku").unwrap();
        assert!(!item.has("sku"));
    }

    #[test]
    fn test_record_shape() {
        let mut item = Item::from_attributes(attrs(json!({
            "rowId": "r1", "id": "SKU-9", "name": "Tee", "qty": 2, "price": 12.5,
            "discount": "5%", "color": "blue"
        })))
        .unwrap();

        let record = item.to_record();
        assert_eq!(
            Value::Object(record),
            json!({
                "rowId": "r1", "id": "SKU-9", "name": "Tee", "qty": 2, "price": 12.5,
                "discount": "5%", "color": "blue"
            })
        );

        item.set_option(attrs(json!({"name": "size", "value": "L"}))).unwrap();
        assert_eq!(
            item.to_record()["options"],
            json!({"size": {"name": "size", "value": "L"}})
        );
    }

    proptest! {
        /// Any valid price/qty pair with no discount or tax prices at price × qty.
        #[test]
        fn test_plain_price_is_price_times_qty(
            price in 0u32..100_000u32,
            qty in 1u32..1_000u32,
        ) {
            let item = test_item(price as f64 / 100.0, qty as f64);
            prop_assert_eq!(item.calculate_price(), (price as f64 / 100.0) * qty as f64);
        }
    }
}
