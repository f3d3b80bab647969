//! # Attribute Records
//!
//! Generic get/set-by-name access shared by [`Item`](crate::item::Item) and
//! [`ItemOption`](crate::option::ItemOption).
//!
//! ## Accessor Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    set("price", 9.5)                                    │
//! │                          │                                              │
//! │                          ▼                                              │
//! │          ┌───────────────────────────────┐                              │
//! │          │  accessor table (per type)    │                              │
//! │          │  "rowId" "id" "name" "qty"    │                              │
//! │          │  "price" "discount" ...       │                              │
//! │          └───────────────┬───────────────┘                              │
//! │               found      │      not found                               │
//! │          ┌───────────────┴───────────────┐                              │
//! │          ▼                               ▼                              │
//! │   typed setter (parse,            residual map                          │
//! │   validate, normalize)            (extra attributes, kept as-is)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Known fields always win over the residual map, so an attribute map can
//! never shadow a typed field.

use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult};

/// Flat attribute map as received from a host payload.
pub type Attributes = Map<String, Value>;

// =============================================================================
// Accessor Table
// =============================================================================

/// One entry of a type's accessor table.
pub struct FieldAccessor<T> {
    /// Attribute name as it appears in records.
    pub name: &'static str,
    /// Computed getter; `None` means the field is unset.
    pub get: fn(&T) -> Option<Value>,
    /// Typed setter; `Value::Null` resets optional fields.
    pub set: fn(&mut T, Value) -> ValidationResult<()>,
}

/// A typed record with a residual map for unknown attributes.
pub trait AttributeRecord: Clone + Sized + 'static {
    /// Fields that must be present and non-empty for `fill` to succeed.
    const REQUIRED: &'static [&'static str];

    /// The dispatch table of known fields, in record order.
    fn accessors() -> &'static [FieldAccessor<Self>];

    /// Attributes with no dedicated accessor.
    fn extra(&self) -> &Attributes;

    fn extra_mut(&mut self) -> &mut Attributes;

    fn accessor(key: &str) -> Option<&'static FieldAccessor<Self>> {
        Self::accessors().iter().find(|accessor| accessor.name == key)
    }

    /// Reads an attribute. Missing keys return `None`.
    fn get_attribute(&self, key: &str) -> Option<Value> {
        match Self::accessor(key) {
            Some(accessor) => (accessor.get)(self),
            None => self.extra().get(key).cloned(),
        }
    }

    /// Writes an attribute through its accessor, or into the residual map.
    fn set_attribute(&mut self, key: &str, value: Value) -> ValidationResult<()> {
        match Self::accessor(key) {
            Some(accessor) => (accessor.set)(self, value),
            None => {
                self.extra_mut().insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    /// Clears an attribute. Known fields are reset by setting them to null.
    fn unset_attribute(&mut self, key: &str) -> ValidationResult<()> {
        match Self::accessor(key) {
            Some(accessor) => (accessor.set)(self, Value::Null),
            None => {
                self.extra_mut().remove(key);
                Ok(())
            }
        }
    }

    fn has_attribute(&self, key: &str) -> bool {
        self.get_attribute(key).is_some_and(|value| !value.is_null())
    }

    /// Checks that every required field is present and non-empty.
    fn validate(attributes: &Attributes) -> ValidationResult<()> {
        for field in Self::REQUIRED {
            if is_blank(attributes.get(*field)) {
                return Err(ValidationError::required(*field));
            }
        }
        Ok(())
    }

    /// Validates, then assigns every attribute.
    ///
    /// Assignment happens on a copy, so a setter failure leaves `self`
    /// untouched.
    fn fill_from(&mut self, attributes: Attributes) -> ValidationResult<&mut Self> {
        Self::validate(&attributes)?;

        let mut next = self.clone();
        for (key, value) in attributes {
            next.set_attribute(&key, value)?;
        }
        *self = next;

        Ok(self)
    }

    /// Full flat record: known fields first (unset ones omitted), then extras.
    fn record(&self) -> Attributes {
        let mut record = Attributes::new();
        for accessor in Self::accessors() {
            if let Some(value) = (accessor.get)(self) {
                record.insert(accessor.name.to_string(), value);
            }
        }
        for (key, value) in self.extra() {
            record.insert(key.clone(), value.clone());
        }
        record
    }
}

// =============================================================================
// Value Helpers
// =============================================================================

/// True for values that count as "empty" for required fields.
///
/// Missing, null, blank strings, empty arrays and empty objects are blank.
/// Numbers (including 0) and booleans are present.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Number(_)) | Some(Value::Bool(_)) => false,
    }
}

/// Reads a numeric field from a number or numeric string.
pub fn number_field(field: &str, value: &Value) -> ValidationResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::invalid(field, "must be a number"))
}

/// Reads a text field from a string, number or boolean.
pub fn text_field(field: &str, value: &Value) -> ValidationResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ValidationError::invalid(field, "must be text")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
