//! GlobalSpeak course marketplace backend.
//!
//! Exposes the router and its building blocks so integration tests can drive
//! the HTTP surface in-process.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::services::PaymentService;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across all handlers
pub struct AppState {
    pub db: Database,
    pub payments: PaymentService,
    pub config: Config,
}

/// Build the router with every route and the shared middleware stack
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        // Course routes
        .route("/allcourses", get(routes::courses::list_approved))
        .route("/courses", get(routes::courses::list_all))
        .route("/courses/:id", patch(routes::courses::set_status))
        .route("/myclasses", get(routes::courses::filter))
        .route(
            "/myclasses/:id",
            get(routes::courses::show).put(routes::courses::upsert),
        )
        .route("/add-class", post(routes::courses::create))
        // Instructor routes
        .route("/instructors", get(routes::instructors::index))
        // Cart routes
        .route(
            "/cart",
            get(routes::cart::show).post(routes::cart::add),
        )
        .route("/cart/:id", delete(routes::cart::remove))
        // Payment routes
        .route("/create-payment-intent", post(routes::payments::create_intent))
        .route(
            "/payments",
            post(routes::payments::record).get(routes::payments::append),
        )
        // User routes
        .route(
            "/users",
            get(routes::users::show).post(routes::users::register),
        )
        // Middleware
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
