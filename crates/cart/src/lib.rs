//! Rocket Shoes Cart - client-side cart state manager.
//!
//! Keeps an ordered list of cart lines, validates every quantity change
//! against live stock from the catalog API, and persists the full cart to
//! durable key-value storage after each mutation.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart and exposes add/remove/update
//! - [`catalog`] looks up products and stock (`GET products/{id}`, `GET stock/{id}`)
//! - [`storage`] persists the cart under a single key
//! - [`notify`] maps failures to fixed user-facing messages for the UI layer
//!
//! Mutations return `Result<Arc<Cart>, CartError>`; the store itself never
//! shows anything to the user.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use catalog::{Catalog, CatalogError, HttpCatalog};
pub use config::{CartConfig, CatalogConfig, ConfigError, DEFAULT_STORAGE_KEY};
pub use error::{CartError, CartOperation};
pub use notify::{Notice, NoticeKind, Notifier, TracingNotifier, report};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, UpdateProductAmount};
