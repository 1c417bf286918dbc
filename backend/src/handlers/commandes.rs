//! Order and approval handlers
//!
//! The /commandes surface: stats, the purchasing and review queues, order
//! placement, receipts, the approval workflow and the reorder digest
//! trigger. Responses keep the French wire vocabulary the frontend expects.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::types::ApprovalStatus;

use crate::error::AppResult;
use crate::middleware::auth::CurrentUser;
use crate::services::{ApprovalService, OrderingService};
use crate::AppState;

/// Approval status as the frontend spells it.
fn statut_wire(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::None => "aucune",
        ApprovalStatus::Pending => "en_attente",
        ApprovalStatus::Approved => "approuvee",
        ApprovalStatus::Refused => "refusee",
    }
}

/// GET /commandes/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let service = OrderingService::new(state.db, state.dispatcher);
    let stats = service.stats().await?;
    Ok(Json(json!(stats)))
}

/// GET /commandes/toorders
///
/// Parts below their minimum with an approved purchase request.
pub async fn to_order(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let service = OrderingService::new(state.db, state.dispatcher);
    let pieces = service.list_to_order().await?;
    Ok(Json(json!(pieces)))
}

/// GET /commandes/toorders/en-attente (admin)
///
/// Review queue of reorder proposals not yet approved.
pub async fn pending_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Value>> {
    user.require_admin()?;
    let service = OrderingService::new(state.db, state.dispatcher);
    let pieces = service.list_pending_review().await?;
    Ok(Json(json!(pieces)))
}

/// GET /commandes/commande
///
/// Orders currently in flight.
pub async fn open_orders(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let service = OrderingService::new(state.db, state.dispatcher);
    let pieces = service.list_open_orders().await?;
    Ok(Json(json!(pieces)))
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderPayload {
    pub quantite: i32,
    pub note: Option<String>,
}

/// POST /commandes/commander/{piece_id}
pub async fn place_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(piece_id): Path<i32>,
    Json(payload): Json<PlaceOrderPayload>,
) -> AppResult<Json<Value>> {
    let service = OrderingService::new(state.db, state.dispatcher);
    let outcome = service
        .place_order(piece_id, payload.quantite, payload.note, &user.username)
        .await?;
    Ok(Json(json!(outcome)))
}

/// PUT /commandes/ordersall/{piece_id}
///
/// Total receipt of the open order.
pub async fn receive_all(
    State(state): State<AppState>,
    Path(piece_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let service = OrderingService::new(state.db, state.dispatcher);
    let outcome = service.receive_all(piece_id).await?;
    Ok(Json(json!(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct PartialReceiptQuery {
    pub qty: i32,
}

/// PUT /commandes/orderspar/{piece_id}?qty=N
///
/// Partial receipt of `qty` units.
pub async fn receive_partial(
    State(state): State<AppState>,
    Path(piece_id): Path<i32>,
    Query(params): Query<PartialReceiptQuery>,
) -> AppResult<Json<Value>> {
    let service = OrderingService::new(state.db, state.dispatcher);
    let outcome = service.receive_partial(piece_id, params.qty).await?;
    Ok(Json(json!(outcome)))
}

/// POST /commandes/toorders/{piece_id}/soumettre
pub async fn submit_approval(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(piece_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let service = ApprovalService::new(state.db, state.dispatcher);
    let status = service.submit(piece_id, &user.username).await?;
    Ok(Json(json!({ "status": statut_wire(status) })))
}

#[derive(Debug, Deserialize, Default)]
pub struct DecisionPayload {
    pub note: Option<String>,
}

/// POST /commandes/toorders/{piece_id}/approuver (admin)
pub async fn approve(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(piece_id): Path<i32>,
    payload: Option<Json<DecisionPayload>>,
) -> AppResult<Json<Value>> {
    user.require_admin()?;
    let note = payload.and_then(|Json(p)| p.note);
    let service = ApprovalService::new(state.db, state.dispatcher);
    let status = service.approve(piece_id, &user.username, note).await?;
    Ok(Json(json!({ "status": statut_wire(status) })))
}

/// POST /commandes/toorders/{piece_id}/refuser (admin)
pub async fn refuse(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(piece_id): Path<i32>,
    payload: Option<Json<DecisionPayload>>,
) -> AppResult<Json<Value>> {
    user.require_admin()?;
    let note = payload.and_then(|Json(p)| p.note);
    let service = ApprovalService::new(state.db, state.dispatcher);
    let status = service.refuse(piece_id, &user.username, note).await?;
    Ok(Json(json!({ "status": statut_wire(status) })))
}

/// POST /commandes/toorders/{piece_id}/reset-approbation (admin)
pub async fn reset_approval(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(piece_id): Path<i32>,
) -> AppResult<Json<Value>> {
    user.require_admin()?;
    let service = ApprovalService::new(state.db, state.dispatcher);
    service.reset(piece_id).await?;
    Ok(Json(json!({ "message": "Approbation réinitialisée" })))
}

/// POST /commandes/notifier-a-commander (admin)
///
/// Send the reorder digest to subscribed users.
pub async fn notify_reorder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Value>> {
    user.require_admin()?;
    let service = OrderingService::new(state.db, state.dispatcher);
    let count = service.trigger_reorder_digest().await?;
    if count == 0 {
        return Ok(Json(json!({
            "message": "Aucune pièce à commander",
            "pieces": 0,
        })));
    }
    Ok(Json(json!({
        "message": "Notification envoyée",
        "pieces": count,
    })))
}
