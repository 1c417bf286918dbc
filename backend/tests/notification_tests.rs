//! Notification preference tests
//!
//! Tests for recipient eligibility:
//! - Per-kind defaults when a flag was never set
//! - Explicit flags winning over defaults
//! - Malformed preference values falling back to the default
//! - Admin-only restriction of approval requests

use proptest::prelude::*;
use serde_json::json;
use shared::prefs::notifications_enabled;
use shared::types::EventKind;

const ALL_KINDS: [EventKind; 5] = [
    EventKind::PiecesACommander,
    EventKind::DemandeApprobation,
    EventKind::ApprobationAccordee,
    EventKind::ApprobationRefusee,
    EventKind::PieceCommandee,
];

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_prefs() {
        // Everything defaults on except the order-placed notification
        assert!(notifications_enabled(None, EventKind::PiecesACommander));
        assert!(notifications_enabled(None, EventKind::DemandeApprobation));
        assert!(notifications_enabled(None, EventKind::ApprobationAccordee));
        assert!(notifications_enabled(None, EventKind::ApprobationRefusee));
        assert!(!notifications_enabled(None, EventKind::PieceCommandee));
    }

    #[test]
    fn test_explicit_flag_wins() {
        let prefs = json!({
            "pieces_a_commander": false,
            "piece_commandee": true,
        });
        assert!(!notifications_enabled(Some(&prefs), EventKind::PiecesACommander));
        assert!(notifications_enabled(Some(&prefs), EventKind::PieceCommandee));
    }

    #[test]
    fn test_missing_key_uses_default() {
        let prefs = json!({ "approbation_accordee": false });
        assert!(!notifications_enabled(Some(&prefs), EventKind::ApprobationAccordee));
        // Untouched keys keep their defaults
        assert!(notifications_enabled(Some(&prefs), EventKind::DemandeApprobation));
        assert!(!notifications_enabled(Some(&prefs), EventKind::PieceCommandee));
    }

    #[test]
    fn test_non_boolean_value_falls_back() {
        let prefs = json!({ "pieces_a_commander": "oui", "piece_commandee": 1 });
        assert!(notifications_enabled(Some(&prefs), EventKind::PiecesACommander));
        assert!(!notifications_enabled(Some(&prefs), EventKind::PieceCommandee));
    }

    #[test]
    fn test_prefs_that_are_not_an_object() {
        let prefs = json!("tout");
        assert!(notifications_enabled(Some(&prefs), EventKind::PiecesACommander));
    }

    #[test]
    fn test_only_approval_requests_are_admin_only() {
        for kind in ALL_KINDS {
            assert_eq!(kind.admin_only(), kind == EventKind::DemandeApprobation);
        }
    }

    #[test]
    fn test_pref_keys_are_distinct() {
        let mut keys: Vec<_> = ALL_KINDS.iter().map(|k| k.pref_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ALL_KINDS.len());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn kind_strategy() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::PiecesACommander),
        Just(EventKind::DemandeApprobation),
        Just(EventKind::ApprobationAccordee),
        Just(EventKind::ApprobationRefusee),
        Just(EventKind::PieceCommandee),
    ]
}

proptest! {
    /// With an explicit boolean flag, eligibility is exactly that flag.
    #[test]
    fn prop_explicit_flag_is_authoritative(kind in kind_strategy(), flag in any::<bool>()) {
        let prefs = json!({ kind.pref_key(): flag });
        prop_assert_eq!(notifications_enabled(Some(&prefs), kind), flag);
    }

    /// Flags for other kinds never influence this kind.
    #[test]
    fn prop_foreign_flags_are_ignored(
        kind in kind_strategy(),
        other in kind_strategy(),
        flag in any::<bool>(),
    ) {
        prop_assume!(kind != other);
        let prefs = json!({ other.pref_key(): flag });
        prop_assert_eq!(
            notifications_enabled(Some(&prefs), kind),
            kind.default_enabled()
        );
    }

    /// An empty preference map behaves exactly like no map at all.
    #[test]
    fn prop_empty_map_equals_defaults(kind in kind_strategy()) {
        let prefs = json!({});
        prop_assert_eq!(
            notifications_enabled(Some(&prefs), kind),
            notifications_enabled(None, kind)
        );
    }
}
