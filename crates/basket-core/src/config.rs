//! # Cart Configuration
//!
//! The small settings object a cart is constructed with.
//!
//! Loading it from files or the environment is the host's job (see
//! basket-store's `Settings`); the core only consumes the values.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "basket";

/// Cart construction settings.
///
/// Accepts both `snake_case` and `camelCase` keys (`storageKey`, `autoSave`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Key the cart record is stored under.
    #[serde(default = "default_storage_key", alias = "storageKey")]
    pub storage_key: String,

    /// Persist after every mutating operation.
    #[serde(default, alias = "autoSave")]
    pub auto_save: bool,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        CartConfig {
            storage_key: default_storage_key(),
            auto_save: false,
        }
    }
}

impl CartConfig {
    pub fn new(storage_key: impl Into<String>, auto_save: bool) -> Self {
        CartConfig {
            storage_key: storage_key.into(),
            auto_save,
        }
    }

    /// Rejects an empty storage key.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(ValidationError::required("storage_key"));
        }
        Ok(())
    }
}
