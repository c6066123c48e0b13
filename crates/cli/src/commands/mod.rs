//! CLI command implementations.

pub mod cart;

use rocket_shoes_cart::{CartError, CatalogError, ConfigError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog client could not be built.
    #[error("Catalog client error: {0}")]
    Catalog(#[from] CatalogError),

    /// A cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}
