//! Carbon Offset Core - Shared types library.
//!
//! This crate provides common types used across the carbon offset estimator:
//! - `server` - HTTP API consumed by the storefront widget and admin callers
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP handling. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the `YYYY-MM` month key
//! - [`estimate`] - Cart subtotal and offset estimate computation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod estimate;
pub mod types;

pub use types::*;
