//! Notification preference resolution
//!
//! Preferences live as a flat JSON object of booleans on the user row, keyed
//! by event kind. A missing map or a missing key falls back to the kind's
//! default, so users receive most notifications without ever opting in.

use serde_json::Value;

use crate::types::EventKind;

/// Resolve whether a user wants notifications for `kind`, given the raw
/// preference map from their row (if any).
pub fn notifications_enabled(prefs: Option<&Value>, kind: EventKind) -> bool {
    match prefs.and_then(|p| p.get(kind.pref_key())) {
        Some(Value::Bool(flag)) => *flag,
        _ => kind.default_enabled(),
    }
}
