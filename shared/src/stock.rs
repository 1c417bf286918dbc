//! Stock evaluation: reorder quantity and stock classification
//!
//! Pure functions invoked on every listing or read of a part.

use crate::types::StockStatus;

/// Compute the quantity to order for a part.
///
/// Returns `minimum - on_hand` when the part is below its minimum threshold
/// and the threshold is meaningful, zero otherwise.
///
/// `maximum` is accepted but intentionally not applied as a ceiling: the
/// production behavior never capped the result, so a part with minimum 50 and
/// maximum 40 still reorders up to the minimum. Apply a cap here only as a
/// deliberate, visible change.
pub fn quantity_to_order(on_hand: i32, minimum: i32, _maximum: i32) -> i32 {
    if on_hand < minimum && minimum > 0 {
        minimum - on_hand
    } else {
        0
    }
}

/// Classify a part's stock level against its minimum threshold.
pub fn stock_status(on_hand: i32, minimum: i32) -> StockStatus {
    if on_hand < minimum {
        StockStatus::Critique
    } else if on_hand == minimum {
        StockStatus::Faible
    } else {
        StockStatus::Ok
    }
}

/// True when a part qualifies for the reorder queue: nothing currently on
/// order and the stock evaluator says a reorder is needed.
pub fn needs_reorder(on_hand: i32, minimum: i32, quantity_ordered: i32) -> bool {
    quantity_ordered <= 0 && on_hand < minimum && minimum > 0
}
