//! Order receipt tests
//!
//! Tests for the receipt arithmetic driving total and partial receipts:
//! - Total receipt conservation and rejection on an empty order
//! - Partial receipt range checks and quantity conservation
//! - Receipt delay stamped on the history ledger

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use shared::ordering::{delay_days, partial_receipt, total_receipt, ReceiptError};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_total_receipt_adds_full_order() {
        let r = total_receipt(2, 3).unwrap();
        assert_eq!(r.on_hand, 5);
        assert_eq!(r.quantity_received, 3);
    }

    #[test]
    fn test_total_receipt_with_nothing_ordered_is_invalid() {
        assert_eq!(total_receipt(7, 0), Err(ReceiptError::NothingToReceive));
    }

    #[test]
    fn test_partial_receipt_moves_qty_across_fields() {
        let r = partial_receipt(10, 1, 5, 2).unwrap();
        assert_eq!(r.on_hand, 12);
        assert_eq!(r.received, 3);
        assert_eq!(r.outstanding, 3);
    }

    #[test]
    fn test_partial_receipt_above_outstanding_is_rejected() {
        let err = partial_receipt(10, 0, 5, 6).unwrap_err();
        assert_eq!(
            err,
            ReceiptError::QuantityOutOfRange {
                qty: 6,
                outstanding: 5
            }
        );
    }

    #[test]
    fn test_partial_receipt_rejects_non_positive_qty() {
        assert!(partial_receipt(10, 0, 5, 0).is_err());
        assert!(partial_receipt(10, 0, 5, -3).is_err());
    }

    #[test]
    fn test_outstanding_can_be_drained_exactly_once() {
        // Concurrency regression in pure form: two receipts each claiming
        // the full outstanding amount cannot both succeed.
        let first = partial_receipt(0, 0, 5, 5).unwrap();
        assert_eq!(first.outstanding, 0);
        assert!(partial_receipt(first.on_hand, first.received, first.outstanding, 5).is_err());
        assert_eq!(first.on_hand, 5);
    }

    #[test]
    fn test_delay_days_between_order_and_receipt() {
        let committed = Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap();
        let received = committed + Duration::days(12) + Duration::hours(5);
        assert_eq!(delay_days(committed, received), 12);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Total receipt conserves quantity: everything ordered lands on hand.
    #[test]
    fn prop_total_receipt_conserves_quantity(
        on_hand in 0..10_000i32,
        ordered in 1..10_000i32,
    ) {
        let r = total_receipt(on_hand, ordered).unwrap();
        prop_assert_eq!(r.on_hand, on_hand + ordered);
        prop_assert_eq!(r.quantity_received, ordered);
    }

    /// Partial receipt conserves quantity across the three fields and never
    /// leaves a negative outstanding amount.
    #[test]
    fn prop_partial_receipt_conserves_quantity(
        on_hand in 0..10_000i32,
        received in 0..10_000i32,
        outstanding in 1..10_000i32,
        qty in 1..10_000i32,
    ) {
        match partial_receipt(on_hand, received, outstanding, qty) {
            Ok(r) => {
                prop_assert!(qty <= outstanding);
                prop_assert_eq!(r.on_hand - on_hand, qty);
                prop_assert_eq!(r.received - received, qty);
                prop_assert_eq!(outstanding - r.outstanding, qty);
                prop_assert!(r.outstanding >= 0);
            }
            Err(_) => prop_assert!(qty > outstanding),
        }
    }

    /// A sequence of accepted partial receipts never receives more than the
    /// initial outstanding amount in total.
    #[test]
    fn prop_receipt_sequence_never_over_receives(
        initial_outstanding in 1..500i32,
        attempts in proptest::collection::vec(1..100i32, 1..20),
    ) {
        let mut on_hand = 0;
        let mut received = 0;
        let mut outstanding = initial_outstanding;
        for qty in attempts {
            if let Ok(r) = partial_receipt(on_hand, received, outstanding, qty) {
                on_hand = r.on_hand;
                received = r.received;
                outstanding = r.outstanding;
            }
        }
        prop_assert!(received <= initial_outstanding);
        prop_assert_eq!(received + outstanding, initial_outstanding);
    }

    /// Delay in days is never negative when receipt follows the order.
    #[test]
    fn prop_delay_non_negative(hours in 0..24_000i64) {
        let committed = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let received = committed + Duration::hours(hours);
        let d = delay_days(committed, received);
        prop_assert!(d >= 0);
        prop_assert_eq!(d, hours / 24);
    }
}
