//! Supplier association registry
//!
//! Links parts to suppliers with per-association purchasing details. At most
//! one association per part carries the principal flag; the registry enforces
//! it with a clear-then-insert inside one transaction, backed by a partial
//! unique index as the last line of defence.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Supplier association service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// One part-supplier link with its purchasing details
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SupplierAssociation {
    pub id: i32,
    pub piece_id: i32,
    pub fournisseur_id: i32,
    pub fournisseur_name: String,
    pub est_principal: bool,
    pub numero_piece_fournisseur: Option<String>,
    pub prix_unitaire: Option<Decimal>,
    pub delai_livraison_jours: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating an association
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAssociation {
    pub fournisseur_id: i32,
    #[serde(default)]
    pub est_principal: bool,
    #[validate(length(max = 100))]
    pub numero_piece_fournisseur: Option<String>,
    pub prix_unitaire: Option<Decimal>,
    #[validate(range(min = 0))]
    pub delai_livraison_jours: Option<i32>,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Associations for one part, principal first.
    pub async fn list_for_piece(&self, piece_id: i32) -> AppResult<Vec<SupplierAssociation>> {
        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM pieces WHERE id = $1")
            .bind(piece_id)
            .fetch_optional(&self.db)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Pièce".to_string()));
        }

        let rows = sqlx::query_as::<_, SupplierAssociation>(
            r#"
            SELECT pf.id, pf.piece_id, pf.fournisseur_id, f.name AS fournisseur_name,
                   pf.est_principal, pf.numero_piece_fournisseur, pf.prix_unitaire,
                   pf.delai_livraison_jours, pf.created_at
            FROM piece_fournisseurs pf
            JOIN fournisseurs f ON f.id = pf.fournisseur_id
            WHERE pf.piece_id = $1
            ORDER BY pf.est_principal DESC, f.name
            "#,
        )
        .bind(piece_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Associate a supplier with a part. A principal association demotes any
    /// existing principal first; both statements run in one transaction so a
    /// concurrent call cannot leave two principals behind.
    pub async fn add_association(
        &self,
        piece_id: i32,
        payload: CreateAssociation,
    ) -> AppResult<SupplierAssociation> {
        payload
            .validate()
            .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

        let mut tx = self.db.begin().await?;

        let piece = sqlx::query_scalar::<_, i32>("SELECT 1 FROM pieces WHERE id = $1 FOR UPDATE")
            .bind(piece_id)
            .fetch_optional(&mut *tx)
            .await?;
        if piece.is_none() {
            return Err(AppError::NotFound("Pièce".to_string()));
        }

        let supplier_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM fournisseurs WHERE id = $1",
        )
        .bind(payload.fournisseur_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Fournisseur".to_string()))?;

        if payload.est_principal {
            sqlx::query(
                "UPDATE piece_fournisseurs SET est_principal = FALSE WHERE piece_id = $1",
            )
            .bind(piece_id)
            .execute(&mut *tx)
            .await?;
        }

        let inserted = sqlx::query_as::<_, (i32, DateTime<Utc>)>(
            r#"
            INSERT INTO piece_fournisseurs
                (piece_id, fournisseur_id, est_principal,
                 numero_piece_fournisseur, prix_unitaire, delai_livraison_jours)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at
            "#,
        )
        .bind(piece_id)
        .bind(payload.fournisseur_id)
        .bind(payload.est_principal)
        .bind(&payload.numero_piece_fournisseur)
        .bind(payload.prix_unitaire)
        .bind(payload.delai_livraison_jours)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(
                "This part already has a principal supplier".to_string(),
            ),
            _ => AppError::DatabaseError(e),
        })?;

        tx.commit().await?;

        Ok(SupplierAssociation {
            id: inserted.0,
            piece_id,
            fournisseur_id: payload.fournisseur_id,
            fournisseur_name: supplier_name,
            est_principal: payload.est_principal,
            numero_piece_fournisseur: payload.numero_piece_fournisseur,
            prix_unitaire: payload.prix_unitaire,
            delai_livraison_jours: payload.delai_livraison_jours,
            created_at: inserted.1,
        })
    }

    /// Remove an association. Scoped by both ids so a mismatched association
    /// id cannot delete another part's link.
    pub async fn remove_association(&self, piece_id: i32, association_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM piece_fournisseurs WHERE id = $1 AND piece_id = $2",
        )
        .bind(association_id)
        .bind(piece_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Association fournisseur".to_string()));
        }
        Ok(())
    }
}
