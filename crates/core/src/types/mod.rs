//! Core types for the carbon offset estimator.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod month;

pub use id::*;
pub use month::{MonthKey, MonthKeyError};
