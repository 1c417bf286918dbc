//! Purchase approval workflow
//!
//! A part's reorder proposal moves through none, pending, approved and
//! refused. Submission is open to any authenticated user; decisions and
//! resets are admin operations enforced at the route layer. Every transition
//! is a single conditional UPDATE so concurrent calls cannot interleave a
//! check with a stale write.

use chrono::Utc;
use shared::types::ApprovalStatus;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::notification::{NotificationDispatcher, NotificationEvent};

/// Approval workflow service
#[derive(Clone)]
pub struct ApprovalService {
    db: PgPool,
    dispatcher: NotificationDispatcher,
}

impl ApprovalService {
    /// Create a new ApprovalService instance
    pub fn new(db: PgPool, dispatcher: NotificationDispatcher) -> Self {
        Self { db, dispatcher }
    }

    /// Submit a part for purchase approval. Moves none or refused to pending,
    /// stamps the requester and the request date, and notifies admins. An
    /// already-pending part is returned as-is with no second notification;
    /// an approved part keeps its decision.
    pub async fn submit(&self, piece_id: i32, username: &str) -> AppResult<ApprovalStatus> {
        let updated = sqlx::query_as::<_, (String,)>(
            r#"
            UPDATE pieces
            SET approval_status = 'pending',
                requested_by = $2,
                approval_date = $3,
                approved_by = NULL,
                approval_note = NULL,
                modified_at = $3
            WHERE id = $1 AND approval_status IN ('none', 'refused')
            RETURNING name
            "#,
        )
        .bind(piece_id)
        .bind(username)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        if let Some((piece_name,)) = updated {
            self.dispatcher.dispatch(NotificationEvent::ApprovalRequested {
                piece_id,
                piece_name,
                requested_by: username.to_string(),
            });
            return Ok(ApprovalStatus::Pending);
        }

        // No transition: either the part is missing or it already sits in a
        // state submit does not change.
        let current = sqlx::query_scalar::<_, String>(
            "SELECT approval_status FROM pieces WHERE id = $1",
        )
        .bind(piece_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pièce".to_string()))?;

        Ok(ApprovalStatus::parse(&current).unwrap_or(ApprovalStatus::None))
    }

    /// Approve a pending request. Valid from any state; stamps the approver,
    /// decision date and note, then notifies the requester when one was
    /// tracked, otherwise the subscribed users.
    pub async fn approve(
        &self,
        piece_id: i32,
        approver: &str,
        note: Option<String>,
    ) -> AppResult<ApprovalStatus> {
        self.decide(piece_id, approver, note, true).await
    }

    /// Refuse a pending request. Symmetric to [`approve`](Self::approve).
    pub async fn refuse(
        &self,
        piece_id: i32,
        approver: &str,
        note: Option<String>,
    ) -> AppResult<ApprovalStatus> {
        self.decide(piece_id, approver, note, false).await
    }

    async fn decide(
        &self,
        piece_id: i32,
        approver: &str,
        note: Option<String>,
        approved: bool,
    ) -> AppResult<ApprovalStatus> {
        let status = if approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Refused
        };

        let row = sqlx::query_as::<_, (String, Option<String>)>(
            r#"
            UPDATE pieces
            SET approval_status = $2,
                approved_by = $3,
                approval_date = $4,
                approval_note = $5,
                modified_at = $4
            WHERE id = $1
            RETURNING name, requested_by
            "#,
        )
        .bind(piece_id)
        .bind(status.as_str())
        .bind(approver)
        .bind(Utc::now())
        .bind(&note)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pièce".to_string()))?;

        let (piece_name, requester) = row;
        let note = note.unwrap_or_default();
        let event = if approved {
            NotificationEvent::ApprovalGranted {
                piece_name,
                note,
                requester,
            }
        } else {
            NotificationEvent::ApprovalRefused {
                piece_name,
                note,
                requester,
            }
        };
        self.dispatcher.dispatch(event);

        Ok(status)
    }

    /// Clear the approval state back to none. No notification is sent.
    pub async fn reset(&self, piece_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE pieces
            SET approval_status = 'none',
                approved_by = NULL,
                approval_date = NULL,
                approval_note = NULL,
                requested_by = NULL,
                modified_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(piece_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Pièce".to_string()));
        }
        Ok(())
    }
}
