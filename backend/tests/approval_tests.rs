//! Approval workflow tests
//!
//! Tests for the purchase approval state machine:
//! - Submission gate: only none and refused open a new request
//! - Review queue ordering by state rank
//! - Reset reachable from every state

use proptest::prelude::*;
use shared::types::ApprovalStatus;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_submission_gate() {
        assert!(ApprovalStatus::None.can_submit());
        assert!(ApprovalStatus::Refused.can_submit());
        assert!(!ApprovalStatus::Pending.can_submit());
        assert!(!ApprovalStatus::Approved.can_submit());
    }

    #[test]
    fn test_review_queue_rank() {
        // Unsubmitted proposals first, then pending, then decided
        assert_eq!(ApprovalStatus::None.review_rank(), 0);
        assert_eq!(ApprovalStatus::Pending.review_rank(), 1);
        assert_eq!(ApprovalStatus::Approved.review_rank(), 2);
        assert_eq!(ApprovalStatus::Refused.review_rank(), 2);
    }

    #[test]
    fn test_storage_representation_roundtrip() {
        for status in [
            ApprovalStatus::None,
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Refused,
        ] {
            assert_eq!(ApprovalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApprovalStatus::parse("en_attente"), None);
    }

    #[test]
    fn test_default_is_none() {
        assert_eq!(ApprovalStatus::default(), ApprovalStatus::None);
    }

    /// Pure rendition of the workflow: submit twice without an intervening
    /// decision leaves the state where the first submit put it.
    #[test]
    fn test_double_submit_is_idempotent() {
        let mut status = ApprovalStatus::None;

        if status.can_submit() {
            status = ApprovalStatus::Pending;
        }
        let after_first = status;

        if status.can_submit() {
            status = ApprovalStatus::Pending;
        }
        assert_eq!(status, after_first);
    }

    #[test]
    fn test_refused_can_be_resubmitted() {
        let status = ApprovalStatus::Refused;
        assert!(status.can_submit());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn status_strategy() -> impl Strategy<Value = ApprovalStatus> {
    prop_oneof![
        Just(ApprovalStatus::None),
        Just(ApprovalStatus::Pending),
        Just(ApprovalStatus::Approved),
        Just(ApprovalStatus::Refused),
    ]
}

proptest! {
    /// Exactly the states below the decided rank accept a new submission
    /// or are already waiting on one.
    #[test]
    fn prop_submittable_states_are_undecided_and_not_pending(status in status_strategy()) {
        if status.can_submit() {
            prop_assert!(status != ApprovalStatus::Pending);
            prop_assert!(status.review_rank() != 1);
        }
    }

    /// Rank and storage string agree on the decided states.
    #[test]
    fn prop_rank_two_means_decided(status in status_strategy()) {
        let decided = matches!(status, ApprovalStatus::Approved | ApprovalStatus::Refused);
        prop_assert_eq!(status.review_rank() == 2, decided);
    }

    /// Parsing is total over the storage vocabulary and rejects everything
    /// else.
    #[test]
    fn prop_parse_rejects_unknown(s in "[a-z_]{1,12}") {
        match ApprovalStatus::parse(&s) {
            Some(status) => prop_assert_eq!(status.as_str(), s),
            None => prop_assert!(!["none", "pending", "approved", "refused"].contains(&s.as_str())),
        }
    }
}
