//! # Error Types
//!
//! Domain-specific error types for basket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  basket-core errors (this file)                                        │
//! │  ├── CartError        - Cart mutation failures (duplicate, not found)  │
//! │  ├── ValidationError  - Required field missing / bad format            │
//! │  └── StoreError       - Failure reported by a CartStore backend        │
//! │                                                                         │
//! │  basket-store errors (separate crate)                                  │
//! │  └── SettingsError    - Settings file / environment failures           │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │        StoreError ──────┴──► CartError ──► host application            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, row id)
//! 3. Errors are enum variants, never String
//! 4. Nothing is retried here; the host translates errors for its users

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors raised by cart operations.
///
/// A failure in the middle of a list-shaped `add`/`update`/`remove` stops the
/// remaining elements. Elements applied before the failure stay applied.
#[derive(Debug, Error)]
pub enum CartError {
    /// Item or option attributes failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An item with this row id is already in the cart.
    ///
    /// ## When This Occurs
    /// - `add` with an explicit `rowId` that is already used
    /// - `add` of an `Item` whose row id is already used
    #[error("Item with row id '{row_id}' already exists")]
    DuplicateRow { row_id: String },

    /// No item with this row id is in the cart.
    ///
    /// ## When This Occurs
    /// - `update`/`remove` with an unknown row id
    /// - `update` with attributes that carry no `rowId` (row_id is empty)
    #[error("Item not found: '{row_id}'")]
    NotFound { row_id: String },

    /// The persistence backend failed.
    ///
    /// When this comes from an auto-save, the operation's in-memory change
    /// has been rolled back.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Cart could not be rendered as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CartError {
    /// Creates a DuplicateRow error.
    pub fn duplicate(row_id: impl Into<String>) -> Self {
        CartError::DuplicateRow {
            row_id: row_id.into(),
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(row_id: impl Into<String>) -> Self {
        CartError::NotFound {
            row_id: row_id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Attribute validation errors.
///
/// Raised by `fill` on items and options before any attribute is assigned.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field has a value of the wrong shape (e.g. non-numeric price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Errors reported by a [`CartStore`](crate::store::CartStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed (file stores).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored blob could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CartError::duplicate("abc123");
        assert_eq!(err.to_string(), "Item with row id 'abc123' already exists");

        let err = CartError::not_found("zzz");
        assert_eq!(err.to_string(), "Item not found: 'zzz'");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("price");
        assert_eq!(err.to_string(), "price is required");

        let err = ValidationError::invalid("qty", "must be a number");
        assert_eq!(err.to_string(), "qty has invalid format: must be a number");
    }

    #[test]
    fn test_validation_converts_to_cart_error() {
        let validation_err = ValidationError::required("name");
        let cart_err: CartError = validation_err.into();
        assert!(matches!(cart_err, CartError::Validation(_)));
    }

    #[test]
    fn test_store_error_converts_to_cart_error() {
        let store_err = StoreError::Backend("lock poisoned".to_string());
        let cart_err: CartError = store_err.into();
        assert!(matches!(cart_err, CartError::Storage(_)));
        assert_eq!(
            cart_err.to_string(),
            "Storage error: Backend error: lock poisoned"
        );
    }
}
