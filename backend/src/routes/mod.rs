//! Route definitions for the replenishment server

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health::health_check))
        // Protected routes - ordering and approval workflow
        .nest("/commandes", commande_routes())
        // Protected routes - supplier associations per part
        .nest("/pieces", piece_routes())
        // Protected routes - history ledger
        .nest("/historique", historique_routes())
}

/// Ordering and approval routes (protected)
fn commande_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::commandes::stats))
        .route("/toorders", get(handlers::commandes::to_order))
        .route("/toorders/en-attente", get(handlers::commandes::pending_review))
        .route("/commande", get(handlers::commandes::open_orders))
        .route("/commander/:piece_id", post(handlers::commandes::place_order))
        .route("/ordersall/:piece_id", put(handlers::commandes::receive_all))
        .route("/orderspar/:piece_id", put(handlers::commandes::receive_partial))
        .route(
            "/toorders/:piece_id/soumettre",
            post(handlers::commandes::submit_approval),
        )
        .route(
            "/toorders/:piece_id/approuver",
            post(handlers::commandes::approve),
        )
        .route(
            "/toorders/:piece_id/refuser",
            post(handlers::commandes::refuse),
        )
        .route(
            "/toorders/:piece_id/reset-approbation",
            post(handlers::commandes::reset_approval),
        )
        .route(
            "/notifier-a-commander",
            post(handlers::commandes::notify_reorder),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier association routes (protected)
fn piece_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:piece_id/fournisseurs",
            get(handlers::fournisseurs::list_for_piece),
        )
        .route(
            "/:piece_id/fournisseurs",
            post(handlers::fournisseurs::add_association),
        )
        .route(
            "/:piece_id/fournisseurs/:association_id",
            delete(handlers::fournisseurs::remove_association),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// History ledger routes (protected)
fn historique_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::historique::list))
        .route("/piece/:piece_id", get(handlers::historique::list_for_piece))
        .route_layer(middleware::from_fn(auth_middleware))
}
