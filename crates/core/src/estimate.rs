//! Cart subtotal and offset estimate computation.
//!
//! The estimate is a pure function of the cart contents and the effective
//! offset rate. Resolving the effective rate (merchant override vs. the
//! global default) is the caller's job; this module never touches storage.

use serde::{Deserialize, Serialize};

/// A single cart line as reported by the storefront widget.
///
/// The widget sends additional descriptive fields (weight, product type,
/// vendor) that the estimate formula does not use; they are ignored during
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Unit price in minor currency units (e.g. cents).
    pub price_cents: i64,
    /// Number of units in the cart.
    pub quantity: i64,
}

/// Result of an estimate computation, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    /// Sum of `price_cents * quantity` over all items.
    pub subtotal_cents: i64,
    /// Offset estimate: `subtotal_cents * rate`, rounded half to even.
    pub estimate_cents: i64,
}

/// Errors that can occur when computing an estimate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimateError {
    /// An item has a negative unit price.
    #[error("price_cents must be non-negative (got {0})")]
    NegativePrice(i64),
    /// An item has a negative quantity.
    #[error("quantity must be non-negative (got {0})")]
    NegativeQuantity(i64),
}

/// Compute the cart subtotal and offset estimate for the given rate.
///
/// The subtotal is exact integer arithmetic in minor currency units. The
/// estimate rounds `subtotal * rate` to the nearest integer unit, ties to
/// even. An empty cart yields zero for both.
///
/// # Errors
///
/// Returns [`EstimateError`] if any item carries a negative price or
/// quantity. Negative amounts would silently produce negative estimates, so
/// they are rejected here rather than passed through.
pub fn compute(items: &[CartItem], rate: f64) -> Result<Estimate, EstimateError> {
    let mut subtotal_cents: i64 = 0;
    for item in items {
        if item.price_cents < 0 {
            return Err(EstimateError::NegativePrice(item.price_cents));
        }
        if item.quantity < 0 {
            return Err(EstimateError::NegativeQuantity(item.quantity));
        }
        subtotal_cents += item.price_cents * item.quantity;
    }

    #[allow(clippy::cast_precision_loss)] // realistic cart subtotals fit f64 exactly
    #[allow(clippy::cast_possible_truncation)] // rounded value is integral
    let estimate_cents = (subtotal_cents as f64 * rate).round_ties_even() as i64;

    Ok(Estimate {
        subtotal_cents,
        estimate_cents,
    })
}
