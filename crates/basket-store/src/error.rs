//! # Error Types
//!
//! Errors raised while loading, validating or saving `basket.toml`, and
//! while opening a configured cart. Storage failures themselves are
//! `basket_core::StoreError`.

use thiserror::Error;

use basket_core::{CartError, ValidationError};

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML (or has wrongly typed values).
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be encoded as TOML.
    #[error("Failed to write settings: {0}")]
    Write(#[from] toml::ser::Error),

    /// A loaded value failed validation.
    #[error("Invalid settings: {0}")]
    Validation(#[from] ValidationError),

    /// No explicit path was given and the platform has no config/data dir.
    #[error("No {0} directory available on this platform")]
    NoPlatformDir(&'static str),
}

/// Result type alias for [`open_cart`](crate::open_cart).
pub type OpenResult<T> = Result<T, OpenError>;

/// Opening a configured cart fails either on settings or on the cart load.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to open cart: {0}")]
    Cart(#[from] CartError),
}
