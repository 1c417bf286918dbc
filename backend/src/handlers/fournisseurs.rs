//! Supplier association handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::services::supplier::{CreateAssociation, SupplierService};
use crate::AppState;

/// GET /pieces/{piece_id}/fournisseurs
pub async fn list_for_piece(
    State(state): State<AppState>,
    Path(piece_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let service = SupplierService::new(state.db);
    let associations = service.list_for_piece(piece_id).await?;
    Ok(Json(json!(associations)))
}

/// POST /pieces/{piece_id}/fournisseurs
pub async fn add_association(
    State(state): State<AppState>,
    Path(piece_id): Path<i32>,
    Json(payload): Json<CreateAssociation>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let service = SupplierService::new(state.db);
    let association = service.add_association(piece_id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!(association))))
}

/// DELETE /pieces/{piece_id}/fournisseurs/{association_id}
pub async fn remove_association(
    State(state): State<AppState>,
    Path((piece_id, association_id)): Path<(i32, i32)>,
) -> AppResult<Json<Value>> {
    let service = SupplierService::new(state.db);
    service.remove_association(piece_id, association_id).await?;
    Ok(Json(json!({ "message": "Association supprimée" })))
}
