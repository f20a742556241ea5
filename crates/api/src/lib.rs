//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for auth, expenses and exchange rates
//! - Authentication middleware
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use sea_orm::DatabaseConnection;
use spendflow_core::auth::{AuthService, UserStore};
use spendflow_core::currency::CurrencyConverter;
use spendflow_core::expense::{ExpenseRepository, ExpenseService};
use spendflow_core::workflow::ApprovalFlow;
use spendflow_db::{SeaOrmExpenseRepository, SeaOrmUserStore};
use spendflow_shared::JwtService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Registration and login.
    pub auth: Arc<AuthService>,
    /// Expense submission and approval.
    pub expenses: Arc<ExpenseService>,
    /// Live exchange-rate table.
    pub converter: Arc<CurrencyConverter>,
}

impl AppState {
    /// Builds the state from explicit stores.
    pub fn new(
        users: Arc<dyn UserStore>,
        repository: Arc<dyn ExpenseRepository>,
        jwt_service: JwtService,
        converter: Arc<CurrencyConverter>,
        flow: ApprovalFlow,
    ) -> Self {
        Self {
            jwt_service: Arc::new(jwt_service.clone()),
            auth: Arc::new(AuthService::new(users, jwt_service)),
            expenses: Arc::new(ExpenseService::new(
                repository,
                Arc::clone(&converter),
                flow,
            )),
            converter,
        }
    }

    /// Builds the state backed by PostgreSQL.
    pub fn with_database(
        db: DatabaseConnection,
        jwt_service: JwtService,
        converter: Arc<CurrencyConverter>,
        flow: ApprovalFlow,
    ) -> Self {
        Self::new(
            Arc::new(SeaOrmUserStore::new(db.clone())),
            Arc::new(SeaOrmExpenseRepository::new(db)),
            jwt_service,
            converter,
            flow,
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
