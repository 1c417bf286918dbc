//! History ledger reads
//!
//! The ledger records order and receipt events per part. Entries are written
//! by the ordering service; this service only reads them back for the
//! history views.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

/// History ledger service
#[derive(Clone)]
pub struct HistoryService {
    db: PgPool,
}

/// One ledger entry. `delais` is the receipt delay in days, set when the
/// entry is closed by a total receipt.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryEntry {
    pub id: i32,
    pub operation: String,
    pub date_cmd: Option<DateTime<Utc>>,
    pub date_recu: Option<DateTime<Utc>>,
    pub quantity: Option<i32>,
    pub quantity_out: Option<i32>,
    pub piece_id: Option<i32>,
    pub piece_name: Option<String>,
    pub piece_number: Option<String>,
    pub description: Option<String>,
    pub acting_user: Option<String>,
    pub delais: Option<f64>,
}

const HISTORY_COLUMNS: &str = r#"
    id, operation, date_cmd, date_recu, quantity, quantity_out,
    piece_id, piece_name, piece_number, description, acting_user, delais
"#;

impl HistoryService {
    /// Create a new HistoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All entries, newest first.
    pub async fn list(&self, limit: i64) -> AppResult<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryEntry>(&format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM historique
            ORDER BY date_cmd DESC NULLS LAST, id DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Entries for one part, newest first.
    pub async fn list_for_piece(&self, piece_id: i32) -> AppResult<Vec<HistoryEntry>> {
        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM pieces WHERE id = $1")
            .bind(piece_id)
            .fetch_optional(&self.db)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Pièce".to_string()));
        }

        let rows = sqlx::query_as::<_, HistoryEntry>(&format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM historique
            WHERE piece_id = $1
            ORDER BY date_cmd DESC NULLS LAST, id DESC
            "#
        ))
        .bind(piece_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
