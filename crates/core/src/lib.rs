//! Rocket Shoes Core - Shared cart types library.
//!
//! This crate provides the domain types used across all Rocket Shoes components:
//! - `cart` - Cart store, catalog client and persistence
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure transitions - no I/O, no HTTP
//! clients, no storage access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, products, stock and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
