use axum::{
    http::Method,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod drivers;
pub mod error;
pub mod middleware;
pub mod rides;
pub mod state;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Everything a driver does goes through the session middleware
    let driver_routes = Router::new()
        .merge(rides::driver_routes())
        .merge(drivers::routes())
        .route_layer(from_fn_with_state(state.clone(), middleware::driver_auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(rides::routes(state.clone()))
        .merge(driver_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
