//! Order lifecycle management
//!
//! A part's ordering state is derived from its quantity fields: unordered,
//! ordered, partially received, and back to unordered on full receipt. This
//! service owns every mutation of those fields plus the listing queues built
//! on top of them. Multi-statement sequences run inside one transaction with
//! a row lock, and the partial receipt is a single conditional UPDATE so two
//! concurrent receipts can never jointly over-receive.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::ordering::{delay_days, total_receipt, ReceiptError};
use shared::stock::{needs_reorder, quantity_to_order, stock_status};
use shared::types::{ApprovalStatus, OperationKind, StockStatus};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::external::mail::ReorderLine;
use crate::services::notification::{NotificationDispatcher, NotificationEvent};

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderingService {
    db: PgPool,
    dispatcher: NotificationDispatcher,
}

/// Inventory statistics for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total_pieces: i64,
    pub stock_critique: i64,
    pub valeur_stock: Decimal,
    pub pieces_a_commander: i64,
}

/// Raw part row as read from storage
#[derive(Debug, Clone, FromRow)]
struct PieceRow {
    id: i32,
    name: String,
    part_number: String,
    description: String,
    on_hand: i32,
    minimum_qty: i32,
    maximum_qty: i32,
    quantity_ordered: i32,
    quantity_received: i32,
    quantity_outstanding: i32,
    unit_price: Decimal,
    order_date: Option<DateTime<Utc>>,
    order_note: Option<String>,
    approval_status: String,
    approved_by: Option<String>,
    approval_date: Option<DateTime<Utc>>,
    approval_note: Option<String>,
    requested_by: Option<String>,
    fournisseur_principal: Option<String>,
}

/// Part as served by the listing endpoints, with the computed stock fields
#[derive(Debug, Clone, Serialize)]
pub struct PieceSummary {
    pub id: i32,
    pub name: String,
    pub part_number: String,
    pub description: String,
    pub on_hand: i32,
    pub minimum_qty: i32,
    pub maximum_qty: i32,
    pub quantity_ordered: i32,
    pub quantity_received: i32,
    pub quantity_outstanding: i32,
    pub unit_price: Decimal,
    pub order_date: Option<DateTime<Utc>>,
    pub order_note: Option<String>,
    pub statut_stock: StockStatus,
    pub quantite_a_commander: i32,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<String>,
    pub approval_date: Option<DateTime<Utc>>,
    pub approval_note: Option<String>,
    pub requested_by: Option<String>,
    pub fournisseur_principal: Option<String>,
}

impl From<PieceRow> for PieceSummary {
    fn from(row: PieceRow) -> Self {
        PieceSummary {
            statut_stock: stock_status(row.on_hand, row.minimum_qty),
            quantite_a_commander: quantity_to_order(row.on_hand, row.minimum_qty, row.maximum_qty),
            approval_status: ApprovalStatus::parse(&row.approval_status)
                .unwrap_or(ApprovalStatus::None),
            id: row.id,
            name: row.name,
            part_number: row.part_number,
            description: row.description,
            on_hand: row.on_hand,
            minimum_qty: row.minimum_qty,
            maximum_qty: row.maximum_qty,
            quantity_ordered: row.quantity_ordered,
            quantity_received: row.quantity_received,
            quantity_outstanding: row.quantity_outstanding,
            unit_price: row.unit_price,
            order_date: row.order_date,
            order_note: row.order_note,
            approved_by: row.approved_by,
            approval_date: row.approval_date,
            approval_note: row.approval_note,
            requested_by: row.requested_by,
            fournisseur_principal: row.fournisseur_principal,
        }
    }
}

/// Outcome of a total receipt
#[derive(Debug, Clone, Serialize)]
pub struct TotalReceiptOutcome {
    pub message: String,
    pub piece_id: i32,
    pub quantity_received: i32,
}

/// Outcome of a partial receipt
#[derive(Debug, Clone, Serialize)]
pub struct PartialReceiptOutcome {
    pub message: String,
    pub piece_id: i32,
    pub quantity: i32,
    pub quantity_outstanding: i32,
}

/// Outcome of committing an order
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderOutcome {
    pub message: String,
    pub piece_id: i32,
    pub quantity_ordered: i32,
}

const PIECE_COLUMNS: &str = r#"
    p.id, p.name, p.part_number, p.description,
    p.on_hand, p.minimum_qty, p.maximum_qty,
    p.quantity_ordered, p.quantity_received, p.quantity_outstanding,
    p.unit_price, p.order_date, p.order_note,
    p.approval_status, p.approved_by, p.approval_date, p.approval_note,
    p.requested_by,
    f.name AS fournisseur_principal
"#;

const PIECE_JOIN: &str = r#"
    FROM pieces p
    LEFT JOIN piece_fournisseurs pf ON pf.piece_id = p.id AND pf.est_principal
    LEFT JOIN fournisseurs f ON f.id = pf.fournisseur_id
"#;

impl OrderingService {
    /// Create a new OrderingService instance
    pub fn new(db: PgPool, dispatcher: NotificationDispatcher) -> Self {
        Self { db, dispatcher }
    }

    /// Inventory statistics: totals, critical stock, stock value, and the
    /// number of parts currently needing a reorder.
    pub async fn stats(&self) -> AppResult<StatsResponse> {
        let total_pieces =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pieces")
                .fetch_one(&self.db)
                .await?;

        // Critical means fully depleted with a meaningful threshold
        let stock_critique = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pieces WHERE on_hand = 0 AND minimum_qty > 0",
        )
        .fetch_one(&self.db)
        .await?;

        let valeur_stock = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(on_hand * unit_price) FROM pieces",
        )
        .fetch_one(&self.db)
        .await?
        .unwrap_or(Decimal::ZERO);

        let pieces_a_commander = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM pieces
            WHERE quantity_ordered <= 0 AND on_hand < minimum_qty AND minimum_qty > 0
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(StatsResponse {
            total_pieces,
            stock_critique,
            valeur_stock,
            pieces_a_commander,
        })
    }

    /// Purchasing queue: parts needing a reorder whose request was approved.
    pub async fn list_to_order(&self) -> AppResult<Vec<PieceSummary>> {
        let rows = sqlx::query_as::<_, PieceRow>(&format!(
            r#"
            SELECT {PIECE_COLUMNS} {PIECE_JOIN}
            WHERE p.quantity_ordered <= 0
              AND p.on_hand < p.minimum_qty
              AND p.minimum_qty > 0
              AND p.approval_status = 'approved'
            ORDER BY p.name
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PieceSummary::from).collect())
    }

    /// Admin review queue: reorder proposals not yet approved. Unsubmitted
    /// proposals come first, then pending requests, then decided ones by
    /// decision date descending with nulls last.
    pub async fn list_pending_review(&self) -> AppResult<Vec<PieceSummary>> {
        let rows = sqlx::query_as::<_, PieceRow>(&format!(
            r#"
            SELECT {PIECE_COLUMNS} {PIECE_JOIN}
            WHERE p.quantity_ordered <= 0
              AND p.on_hand < p.minimum_qty
              AND p.minimum_qty > 0
              AND p.approval_status IN ('none', 'pending', 'refused')
            ORDER BY CASE p.approval_status
                         WHEN 'none' THEN 0
                         WHEN 'pending' THEN 1
                         ELSE 2
                     END,
                     p.approval_date DESC NULLS LAST
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PieceSummary::from).collect())
    }

    /// Orders currently in flight (ordered quantity above zero).
    pub async fn list_open_orders(&self) -> AppResult<Vec<PieceSummary>> {
        let rows = sqlx::query_as::<_, PieceRow>(&format!(
            r#"
            SELECT {PIECE_COLUMNS} {PIECE_JOIN}
            WHERE p.quantity_ordered > 0
            ORDER BY p.order_date DESC NULLS LAST
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PieceSummary::from).collect())
    }

    /// Commit an order: stamp the ordering fields and open a history entry.
    pub async fn place_order(
        &self,
        piece_id: i32,
        qty: i32,
        note: Option<String>,
        acting_user: &str,
    ) -> AppResult<PlaceOrderOutcome> {
        if qty <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "Order quantity must be positive, got {}",
                qty
            )));
        }

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let piece = sqlx::query_as::<_, (String, String)>(
            r#"
            UPDATE pieces
            SET quantity_ordered = $2,
                quantity_outstanding = $2,
                quantity_received = 0,
                order_date = $3,
                order_note = $4,
                modified_at = $3
            WHERE id = $1
            RETURNING name, part_number
            "#,
        )
        .bind(piece_id)
        .bind(qty)
        .bind(now)
        .bind(&note)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Pièce".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO historique
                (operation, date_cmd, quantity, piece_id, piece_name, piece_number, acting_user)
            VALUES ($7, $1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(now)
        .bind(qty)
        .bind(piece_id)
        .bind(&piece.0)
        .bind(&piece.1)
        .bind(acting_user)
        .bind(OperationKind::Commande.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.dispatcher.dispatch(NotificationEvent::OrderPlaced {
            piece_name: piece.0,
            qty,
        });

        Ok(PlaceOrderOutcome {
            message: "Commande passée".to_string(),
            piece_id,
            quantity_ordered: qty,
        })
    }

    /// Total receipt: the full ordered quantity lands in inventory, the
    /// ordering fields and approval are cleared, and the most recent open
    /// history entry is stamped with the received date and delay.
    pub async fn receive_all(&self, piece_id: i32) -> AppResult<TotalReceiptOutcome> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        // Row lock so the guard and the write act on the same values
        let row = sqlx::query_as::<_, (i32, i32)>(
            "SELECT on_hand, quantity_ordered FROM pieces WHERE id = $1 FOR UPDATE",
        )
        .bind(piece_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Pièce".to_string()))?;

        let receipt = total_receipt(row.0, row.1).map_err(|e| match e {
            ReceiptError::NothingToReceive => {
                AppError::InvalidState("Nothing to receive: no open order on this part".to_string())
            }
            other => AppError::InvalidArgument(other.to_string()),
        })?;

        // Receiving closes the cycle: ordering fields zeroed, approval reset
        sqlx::query(
            r#"
            UPDATE pieces
            SET on_hand = $2,
                quantity_ordered = 0,
                quantity_received = 0,
                quantity_outstanding = 0,
                order_date = NULL,
                order_note = NULL,
                approval_status = 'none',
                approved_by = NULL,
                approval_date = NULL,
                approval_note = NULL,
                requested_by = NULL,
                modified_at = $3
            WHERE id = $1
            "#,
        )
        .bind(piece_id)
        .bind(receipt.on_hand)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Stamp the most recent open order/purchase entry in the ledger
        let open_entry = sqlx::query_as::<_, (i32, Option<DateTime<Utc>>)>(
            r#"
            SELECT id, date_cmd
            FROM historique
            WHERE piece_id = $1
              AND operation IN ($2, $3)
              AND date_recu IS NULL
            ORDER BY date_cmd DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(piece_id)
        .bind(OperationKind::Commande.as_str())
        .bind(OperationKind::Achat.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((entry_id, date_cmd)) = open_entry {
            let delais = date_cmd.map(|committed| delay_days(committed, now) as f64);
            sqlx::query("UPDATE historique SET date_recu = $2, delais = $3 WHERE id = $1")
                .bind(entry_id)
                .bind(now)
                .bind(delais)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(TotalReceiptOutcome {
            message: "Réception totale effectuée".to_string(),
            piece_id,
            quantity_received: receipt.quantity_received,
        })
    }

    /// Partial receipt of `qty` units. One conditional UPDATE makes the
    /// check-and-mutate atomic: concurrent receipts on the same part cannot
    /// jointly exceed the outstanding amount. The history ledger is left
    /// untouched; only the total receipt closes the open entry.
    pub async fn receive_partial(
        &self,
        piece_id: i32,
        qty: i32,
    ) -> AppResult<PartialReceiptOutcome> {
        if qty <= 0 {
            return Err(AppError::InvalidArgument(format!(
                "Received quantity must be positive, got {}",
                qty
            )));
        }

        let updated = sqlx::query_as::<_, (i32,)>(
            r#"
            UPDATE pieces
            SET on_hand = on_hand + $2,
                quantity_received = quantity_received + $2,
                quantity_outstanding = GREATEST(0, quantity_outstanding - $2),
                modified_at = NOW()
            WHERE id = $1 AND quantity_outstanding >= $2
            RETURNING quantity_outstanding
            "#,
        )
        .bind(piece_id)
        .bind(qty)
        .fetch_optional(&self.db)
        .await?;

        match updated {
            Some((outstanding,)) => Ok(PartialReceiptOutcome {
                message: "Réception partielle effectuée".to_string(),
                piece_id,
                quantity: qty,
                quantity_outstanding: outstanding,
            }),
            None => {
                // Distinguish a missing part from an out-of-range quantity
                let outstanding = sqlx::query_scalar::<_, i32>(
                    "SELECT quantity_outstanding FROM pieces WHERE id = $1",
                )
                .bind(piece_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Pièce".to_string()))?;

                Err(AppError::InvalidArgument(format!(
                    "Received quantity ({}) exceeds outstanding quantity ({})",
                    qty, outstanding
                )))
            }
        }
    }

    /// Send the reorder digest to subscribed users. Returns the number of
    /// parts in the digest; an empty reorder list sends nothing.
    pub async fn trigger_reorder_digest(&self) -> AppResult<usize> {
        let rows = sqlx::query_as::<_, (String, String, i32, i32, i32, i32)>(
            r#"
            SELECT name, part_number, on_hand, minimum_qty, maximum_qty, quantity_ordered
            FROM pieces
            WHERE quantity_ordered <= 0 AND on_hand < minimum_qty AND minimum_qty > 0
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let pieces: Vec<ReorderLine> = rows
            .into_iter()
            .filter(|r| needs_reorder(r.2, r.3, r.5))
            .map(|r| ReorderLine {
                name: r.0,
                part_number: r.1,
                on_hand: r.2,
                quantity_to_order: quantity_to_order(r.2, r.3, r.4),
            })
            .collect();

        let count = pieces.len();
        if count > 0 {
            self.dispatcher
                .dispatch(NotificationEvent::ReorderNeeded { pieces });
        }

        Ok(count)
    }
}
