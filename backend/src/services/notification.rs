//! Notification dispatcher
//!
//! Fans out workflow events to users by email, based on per-user preference
//! flags. Dispatch is fire-and-forget from the caller's point of view: events
//! go onto a bounded queue owned by a single worker task, so the triggering
//! HTTP response never waits on SMTP. When the queue is full the event is
//! dropped and logged. Per-recipient failures are logged and never propagate.
//! There is no retry and no deduplication: each event re-evaluates the
//! recipient set fresh and sends once per recipient.

use std::sync::Arc;

use shared::prefs::notifications_enabled;
use shared::types::EventKind;
use sqlx::{FromRow, PgPool};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::external::mail::{templates, MailTransport, ReorderLine};

/// A workflow state change worth telling someone about.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// Digest of parts currently below their minimum threshold
    ReorderNeeded { pieces: Vec<ReorderLine> },
    /// A part was submitted for purchase approval
    ApprovalRequested {
        piece_id: i32,
        piece_name: String,
        requested_by: String,
    },
    /// A pending request was approved
    ApprovalGranted {
        piece_name: String,
        note: String,
        requester: Option<String>,
    },
    /// A pending request was refused
    ApprovalRefused {
        piece_name: String,
        note: String,
        requester: Option<String>,
    },
    /// An order was committed to a supplier
    OrderPlaced { piece_name: String, qty: i32 },
}

impl NotificationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            NotificationEvent::ReorderNeeded { .. } => EventKind::PiecesACommander,
            NotificationEvent::ApprovalRequested { .. } => EventKind::DemandeApprobation,
            NotificationEvent::ApprovalGranted { .. } => EventKind::ApprobationAccordee,
            NotificationEvent::ApprovalRefused { .. } => EventKind::ApprobationRefusee,
            NotificationEvent::OrderPlaced { .. } => EventKind::PieceCommandee,
        }
    }
}

/// Cheap clonable handle held in application state. Dropping every handle
/// closes the queue and lets the worker drain and exit.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<NotificationEvent>,
}

impl NotificationDispatcher {
    /// Spawn the worker task and return the dispatch handle alongside the
    /// worker's join handle, which the caller owns for shutdown.
    pub fn spawn(
        db: PgPool,
        mailer: Arc<dyn MailTransport>,
        queue_capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<NotificationEvent>(queue_capacity);
        let worker = NotificationWorker { db, mailer };

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                worker.handle_event(event).await;
            }
            tracing::info!("Notification worker stopped");
        });

        (Self { tx }, handle)
    }

    /// Enqueue an event without blocking. A full queue drops the event.
    pub fn dispatch(&self, event: NotificationEvent) {
        let kind = event.kind();
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!("Notification {:?} dropped: {}", kind, e);
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct RecipientRow {
    username: String,
    email: Option<String>,
    notification_prefs: Option<serde_json::Value>,
}

struct NotificationWorker {
    db: PgPool,
    mailer: Arc<dyn MailTransport>,
}

impl NotificationWorker {
    async fn handle_event(&self, event: NotificationEvent) {
        let kind = event.kind();

        // Approval results go to the tracked requester when one exists
        let requester = match &event {
            NotificationEvent::ApprovalGranted { requester, .. }
            | NotificationEvent::ApprovalRefused { requester, .. } => requester.clone(),
            _ => None,
        };

        let recipients = match &requester {
            Some(username) => self.requester_recipient(username, kind).await,
            None => self.recipients_for(kind).await,
        };

        let recipients = match recipients {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Recipient lookup failed for {:?}: {}", kind, e);
                return;
            }
        };

        for recipient in recipients {
            let Some(email) = recipient.email.as_deref().filter(|e| !e.is_empty()) else {
                continue;
            };
            let (subject, body) = render(&event, &recipient.username);
            if self.mailer.send(email, &subject, &body).await {
                tracing::info!("Sent {} to {} ({})", kind.pref_key(), recipient.username, email);
            } else {
                tracing::error!("Failed to send {} to {}", kind.pref_key(), recipient.username);
            }
        }
    }

    /// All users with a non-empty email and the event kind's flag enabled.
    /// Approval requests are additionally restricted to admins.
    async fn recipients_for(&self, kind: EventKind) -> Result<Vec<RecipientRow>, sqlx::Error> {
        let query = if kind.admin_only() {
            r#"
            SELECT username, email, notification_prefs
            FROM users
            WHERE role = 'admin' AND email IS NOT NULL AND email != ''
            "#
        } else {
            r#"
            SELECT username, email, notification_prefs
            FROM users
            WHERE email IS NOT NULL AND email != ''
            "#
        };

        let rows = sqlx::query_as::<_, RecipientRow>(query)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|r| notifications_enabled(r.notification_prefs.as_ref(), kind))
            .collect())
    }

    /// The single user who submitted the request, if they still qualify.
    async fn requester_recipient(
        &self,
        username: &str,
        kind: EventKind,
    ) -> Result<Vec<RecipientRow>, sqlx::Error> {
        let row = sqlx::query_as::<_, RecipientRow>(
            "SELECT username, email, notification_prefs FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(row
            .into_iter()
            .filter(|r| {
                r.email.as_deref().is_some_and(|e| !e.is_empty())
                    && notifications_enabled(r.notification_prefs.as_ref(), kind)
            })
            .collect())
    }
}

/// Subject and HTML body for one recipient.
fn render(event: &NotificationEvent, username: &str) -> (String, String) {
    match event {
        NotificationEvent::ReorderNeeded { pieces } => templates::reorder_digest(username, pieces),
        NotificationEvent::ApprovalRequested {
            piece_id,
            piece_name,
            requested_by,
        } => templates::approval_request(username, piece_name, *piece_id, requested_by),
        NotificationEvent::ApprovalGranted {
            piece_name, note, ..
        } => templates::approval_result(username, piece_name, true, note),
        NotificationEvent::ApprovalRefused {
            piece_name, note, ..
        } => templates::approval_result(username, piece_name, false, note),
        NotificationEvent::OrderPlaced { piece_name, qty } => {
            templates::order_placed(username, piece_name, *qty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kinds_map_to_pref_keys() {
        let granted = NotificationEvent::ApprovalGranted {
            piece_name: "Filtre HF35".into(),
            note: String::new(),
            requester: None,
        };
        assert_eq!(granted.kind().pref_key(), "approbation_accordee");

        let placed = NotificationEvent::OrderPlaced {
            piece_name: "Filtre HF35".into(),
            qty: 4,
        };
        assert_eq!(placed.kind().pref_key(), "piece_commandee");
        assert!(!placed.kind().default_enabled());
    }

    #[test]
    fn approval_requests_are_admin_only() {
        let event = NotificationEvent::ApprovalRequested {
            piece_id: 7,
            piece_name: "Filtre HF35".into(),
            requested_by: "mgagnon".into(),
        };
        assert!(event.kind().admin_only());
        assert!(!NotificationEvent::OrderPlaced {
            piece_name: String::new(),
            qty: 1
        }
        .kind()
        .admin_only());
    }

    #[test]
    fn render_uses_event_fields() {
        let event = NotificationEvent::ApprovalRefused {
            piece_name: "Filtre HF35".into(),
            note: "budget".into(),
            requester: Some("mgagnon".into()),
        };
        let (subject, body) = render(&event, "mgagnon");
        assert!(subject.contains("Filtre HF35"));
        assert!(body.contains("budget"));
    }
}
