//! Stock evaluation tests
//!
//! Tests for the reorder arithmetic:
//! - Quantity-to-order is the gap to the minimum, never capped by the maximum
//! - Stock status classification against the minimum threshold
//! - Reorder eligibility excludes parts already on order

use proptest::prelude::*;
use shared::stock::{needs_reorder, quantity_to_order, stock_status};
use shared::types::StockStatus;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_quantity_to_order_fills_gap_to_minimum() {
        assert_eq!(quantity_to_order(2, 5, 20), 3);
        assert_eq!(quantity_to_order(0, 10, 50), 10);
    }

    #[test]
    fn test_quantity_to_order_zero_when_stocked() {
        assert_eq!(quantity_to_order(5, 5, 20), 0);
        assert_eq!(quantity_to_order(8, 5, 20), 0);
    }

    #[test]
    fn test_quantity_to_order_zero_when_no_threshold() {
        // A zero minimum means the part is not threshold-managed
        assert_eq!(quantity_to_order(0, 0, 20), 0);
    }

    #[test]
    fn test_maximum_is_accepted_but_never_applied() {
        // The gap to the minimum can exceed the maximum; it is not clamped
        assert_eq!(quantity_to_order(0, 10, 4), 10);
        assert_eq!(quantity_to_order(1, 100, 5), 99);
    }

    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(stock_status(5, 10), StockStatus::Critique);
        assert_eq!(stock_status(10, 10), StockStatus::Faible);
        assert_eq!(stock_status(15, 10), StockStatus::Ok);
    }

    #[test]
    fn test_needs_reorder_requires_no_open_order() {
        assert!(needs_reorder(2, 5, 0));
        // An open order suspends the reorder signal
        assert!(!needs_reorder(2, 5, 3));
        // No threshold, no reorder
        assert!(!needs_reorder(0, 0, 0));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Below the minimum, quantity to order is exactly the gap; at or above
    /// it (or with no threshold) it is zero. The maximum never matters.
    #[test]
    fn prop_quantity_to_order_is_gap_or_zero(
        on_hand in 0..1000i32,
        minimum in 0..1000i32,
        maximum in 0..1000i32,
    ) {
        let qty = quantity_to_order(on_hand, minimum, maximum);
        if minimum > 0 && on_hand < minimum {
            prop_assert_eq!(qty, minimum - on_hand);
        } else {
            prop_assert_eq!(qty, 0);
        }
    }

    /// Swapping the maximum never changes the result.
    #[test]
    fn prop_maximum_is_irrelevant(
        on_hand in 0..1000i32,
        minimum in 0..1000i32,
        max_a in 0..1000i32,
        max_b in 0..1000i32,
    ) {
        prop_assert_eq!(
            quantity_to_order(on_hand, minimum, max_a),
            quantity_to_order(on_hand, minimum, max_b)
        );
    }

    /// A positive quantity to order implies the part qualifies for reorder
    /// whenever nothing is on order.
    #[test]
    fn prop_positive_gap_means_reorder(
        on_hand in 0..1000i32,
        minimum in 1..1000i32,
    ) {
        let qty = quantity_to_order(on_hand, minimum, 0);
        prop_assert_eq!(qty > 0, needs_reorder(on_hand, minimum, 0));
    }

    /// Status is monotone in on-hand for a fixed minimum.
    #[test]
    fn prop_status_matches_threshold(on_hand in 0..1000i32, minimum in 1..1000i32) {
        let status = stock_status(on_hand, minimum);
        match status {
            StockStatus::Critique => prop_assert!(on_hand < minimum),
            StockStatus::Faible => prop_assert_eq!(on_hand, minimum),
            StockStatus::Ok => prop_assert!(on_hand > minimum),
        }
    }
}
