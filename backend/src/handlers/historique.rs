//! History ledger handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::services::HistoryService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// GET /historique
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<Value>> {
    let service = HistoryService::new(state.db);
    let limit = params.limit.unwrap_or(200).clamp(1, 1000);
    let entries = service.list(limit).await?;
    Ok(Json(json!(entries)))
}

/// GET /historique/piece/{piece_id}
pub async fn list_for_piece(
    State(state): State<AppState>,
    Path(piece_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let service = HistoryService::new(state.db);
    let entries = service.list_for_piece(piece_id).await?;
    Ok(Json(json!(entries)))
}
