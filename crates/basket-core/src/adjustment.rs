//! # Adjustment Module
//!
//! Provides the `Adjustment` type: a discount or tax that is either a fixed
//! amount or a percentage of some base.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PERCENTAGE-OR-FIXED VALUES                                             │
//! │                                                                         │
//! │  JSON                    Adjustment              amount(base = 200)     │
//! │  ────                    ──────────              ──────────────────     │
//! │  15                      Fixed(15.0)             15.0                   │
//! │  "15"                    Fixed(15.0)             15.0                   │
//! │  "10%"                   Percent(10.0)           20.0  (200 / 100 × 10) │
//! │  "12.5 %"                Percent(12.5)           25.0                   │
//! │  null / ""               (unset)                 -                      │
//! │                                                                         │
//! │  The BASE depends on the caller:                                        │
//! │    Item → the item's unit price (NOT price × qty)                       │
//! │    Cart → the raw sum of item prices                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use basket_core::adjustment::Adjustment;
//!
//! let discount = Adjustment::from("10%");
//! assert_eq!(discount.amount(200.0), 20.0);
//!
//! let fee = Adjustment::from(15.0);
//! assert_eq!(fee.amount(200.0), 15.0);
//! assert_eq!(discount.to_string(), "10%");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tracing::warn;

// =============================================================================
// Adjustment Type
// =============================================================================

/// A fixed amount or a percentage, as used by item and cart discount/tax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Absolute amount, independent of any base.
    Fixed(f64),
    /// Percentage of a base (10.0 = 10%).
    Percent(f64),
}

impl Adjustment {
    /// Zero fixed adjustment (the cart default).
    #[inline]
    pub const fn zero() -> Self {
        Adjustment::Fixed(0.0)
    }

    /// Parses text leniently.
    ///
    /// Text ending in `%` becomes a percentage, anything else a fixed amount.
    /// The number is read from the leading numeric part of the text
    /// (`"12abc"` reads as 12). Text with no leading number reads as 0.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.strip_suffix('%') {
            Some(percent) => Adjustment::Percent(lenient_number(percent)),
            None => Adjustment::Fixed(lenient_number(text)),
        }
    }

    /// Reads an adjustment from a JSON attribute value.
    ///
    /// Returns `None` for values that count as "not set": null, empty or
    /// whitespace-only strings, `false`, arrays and objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Adjustment::Fixed),
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(Adjustment::parse(s)),
            Value::Bool(true) => Some(Adjustment::Fixed(1.0)),
            Value::Bool(false) | Value::Null => None,
            Value::Array(_) | Value::Object(_) => {
                warn!(value = %value, "Ignoring non-scalar adjustment value");
                None
            }
        }
    }

    /// Renders the adjustment in its wire form (number or `"<n>%"`).
    pub fn to_value(&self) -> Value {
        match self {
            Adjustment::Fixed(amount) => number_value(*amount),
            Adjustment::Percent(_) => Value::String(self.to_string()),
        }
    }

    /// Amount this adjustment represents against `base`.
    ///
    /// ## Example
    /// ```rust
    /// use basket_core::adjustment::Adjustment;
    ///
    /// assert_eq!(Adjustment::Percent(10.0).amount(100.0), 10.0);
    /// assert_eq!(Adjustment::Fixed(5.0).amount(100.0), 5.0);
    /// ```
    pub fn amount(&self, base: f64) -> f64 {
        match self {
            Adjustment::Fixed(amount) => *amount,
            Adjustment::Percent(percent) => base / 100.0 * percent,
        }
    }

    /// The bare number, ignoring whether it is a percentage.
    ///
    /// `Percent(10.0).raw()` is `10.0`. Used by the flat-subtraction total.
    #[inline]
    pub const fn raw(&self) -> f64 {
        match self {
            Adjustment::Fixed(n) | Adjustment::Percent(n) => *n,
        }
    }

    /// Checks if the number is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.raw() == 0.0
    }

    /// Checks if this is a percentage.
    #[inline]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Adjustment::Percent(_))
    }
}

// =============================================================================
// Number Helpers
// =============================================================================

/// Longest leading prefix of `text` that reads as a finite float, or 0.
fn lenient_number(text: &str) -> f64 {
    let text = text.trim();
    let parsed = text[..numeric_prefix_len(text)]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite());

    parsed.unwrap_or_else(|| {
        if !text.is_empty() {
            warn!(value = %text, "Unparsable adjustment, treating as 0");
        }
        0.0
    })
}

/// Byte length of the leading `[+-]digits[.digits][(e|E)[+-]digits]` run.
///
/// Single pass; returns 0 when no digit is found.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_end = digits_from(i);
    let mut end = int_end;
    let mut has_digits = int_end > i;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 || has_digits {
            has_digits |= frac_end > end + 1;
            end = frac_end;
        }
    }

    if !has_digits {
        return 0;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut j = end + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            end = exp_end;
        }
    }

    end
}

/// JSON number for `n`, written as an integer when it has no fraction.
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Default for Adjustment {
    fn default() -> Self {
        Adjustment::zero()
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::Fixed(amount) => write!(f, "{}", amount),
            Adjustment::Percent(percent) => write!(f, "{}%", percent),
        }
    }
}

impl From<f64> for Adjustment {
    fn from(amount: f64) -> Self {
        Adjustment::Fixed(amount)
    }
}

impl From<i64> for Adjustment {
    fn from(amount: i64) -> Self {
        Adjustment::Fixed(amount as f64)
    }
}

impl From<i32> for Adjustment {
    fn from(amount: i32) -> Self {
        Adjustment::Fixed(amount as f64)
    }
}

impl From<&str> for Adjustment {
    fn from(text: &str) -> Self {
        Adjustment::parse(text)
    }
}

impl From<String> for Adjustment {
    fn from(text: String) -> Self {
        Adjustment::parse(&text)
    }
}

impl Serialize for Adjustment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Missing, null and empty values deserialize to zero.
impl<'de> Deserialize<'de> for Adjustment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Adjustment::from_value(&value).unwrap_or_default())
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
    fn test_parse_percent_and_fixed() {
        assert_eq!(Adjustment::parse("10%"), Adjustment::Percent(10.0));
        assert_eq!(Adjustment::parse(" 12.5 % "), Adjustment::Percent(12.5));
        assert_eq!(Adjustment::parse("15"), Adjustment::Fixed(15.0));
        assert_eq!(Adjustment::parse("-3.5"), Adjustment::Fixed(-3.5));
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!(Adjustment::parse("12abc"), Adjustment::Fixed(12.0));
        assert_eq!(Adjustment::parse("abc"), Adjustment::Fixed(0.0));
        assert_eq!(Adjustment::parse("%"), Adjustment::Percent(0.0));
        assert_eq!(Adjustment::parse("inf"), Adjustment::Fixed(0.0));
        assert_eq!(Adjustment::parse("2.5e2kg"), Adjustment::Fixed(250.0));
        assert_eq!(Adjustment::parse("3e"), Adjustment::Fixed(3.0));
        assert_eq!(Adjustment::parse(".5"), Adjustment::Fixed(0.5));
        assert_eq!(Adjustment::parse("7."), Adjustment::Fixed(7.0));
        assert_eq!(Adjustment::parse("-"), Adjustment::Fixed(0.0));
    }

    #[test]
    fn test_numeric_prefix_len() {
        assert_eq!(numeric_prefix_len("12abc"), 2);
        assert_eq!(numeric_prefix_len("-1.5e-3x"), 7);
        assert_eq!(numeric_prefix_len("+.e5"), 0);
        assert_eq!(numeric_prefix_len(""), 0);
    }

    #[test]
    fn test_parse_long_garbage_is_linear() {
        let n = 200_000;
        let text = format!("{}{}", "1".repeat(n), "x".repeat(n));

        let started = std::time::Instant::now();
        let parsed = Adjustment::parse(&text);

        // The digit run overflows f64 and falls back to 0.
        assert_eq!(parsed, Adjustment::Fixed(0.0));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_amount() {
        assert_eq!(Adjustment::from("10%").amount(200.0), 20.0);
        assert_eq!(Adjustment::from("15").amount(200.0), 15.0);
        assert_eq!(Adjustment::from(7.5).amount(1000.0), 7.5);
    }

    #[test]
    fn test_raw_ignores_percent() {
        assert_eq!(Adjustment::from("10%").raw(), 10.0);
        assert_eq!(Adjustment::from(50).raw(), 50.0);
        assert!(Adjustment::zero().is_zero());
        assert!(Adjustment::Percent(0.0).is_zero());
    }

    #[test]
    fn test_from_value_unset_cases() {
        assert_eq!(Adjustment::from_value(&json!(null)), None);
        assert_eq!(Adjustment::from_value(&json!("")), None);
        assert_eq!(Adjustment::from_value(&json!("   ")), None);
        assert_eq!(Adjustment::from_value(&json!(false)), None);
        assert_eq!(Adjustment::from_value(&json!([1, 2])), None);
        assert_eq!(
            Adjustment::from_value(&json!(0)),
            Some(Adjustment::Fixed(0.0))
        );
    }

    #[test]
    fn test_display_and_wire_form() {
        assert_eq!(Adjustment::Percent(10.0).to_string(), "10%");
        assert_eq!(Adjustment::Percent(2.5).to_string(), "2.5%");
        assert_eq!(Adjustment::Fixed(50.0).to_value(), json!(50));
        assert_eq!(Adjustment::Fixed(0.25).to_value(), json!(0.25));
        assert_eq!(Adjustment::Percent(10.0).to_value(), json!("10%"));
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Adjustment::Percent(15.0)).unwrap();
        assert_eq!(json, "\"15%\"");

        let parsed: Adjustment = serde_json::from_str("\"15%\"").unwrap();
        assert_eq!(parsed, Adjustment::Percent(15.0));

        let parsed: Adjustment = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, Adjustment::zero());

        let parsed: Adjustment = serde_json::from_str("12.5").unwrap();
        assert_eq!(parsed, Adjustment::Fixed(12.5));
    }
}
