//! Shared helpers for route tests: in-memory stores and a static rate table.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION},
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use spendflow_core::auth::{Identity, InMemoryUserStore, Role};
use spendflow_core::currency::{CurrencyConverter, ExchangeRateTable, StaticRateProvider};
use spendflow_core::expense::InMemoryExpenseRepository;
use spendflow_core::workflow::ApprovalFlow;
use spendflow_shared::types::{CurrencyCode, UserId};
use spendflow_shared::{JwtConfig, JwtService};
use tower::ServiceExt;

use crate::{AppState, create_router};

pub fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).unwrap()
}

/// Base USD, provider quotes EUR->USD at 1.10.
pub fn test_state(flow: Vec<Role>) -> AppState {
    let table = ExchangeRateTable::new(
        code("EUR"),
        [(code("USD"), dec!(1.10)), (code("GBP"), dec!(0.85))],
        Utc::now(),
    )
    .unwrap();
    let converter = Arc::new(CurrencyConverter::new(
        code("USD"),
        Arc::new(StaticRateProvider::new(table)),
        false,
    ));

    AppState::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryExpenseRepository::new()),
        JwtService::new(JwtConfig::default()),
        converter,
        ApprovalFlow::new(flow).unwrap(),
    )
}

pub fn standard_state() -> AppState {
    test_state(vec![Role::Manager, Role::Finance, Role::Director])
}

/// Issues a token for a fresh user with `role`.
pub fn login_as(state: &AppState, name: &str, role: Role) -> (Identity, String) {
    let identity = Identity::new(UserId::new(), name, role);
    let token = state
        .jwt_service
        .generate_access_token(identity.user_id.into_inner(), name, role.as_str())
        .expect("should generate token");
    (identity, token)
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Runs one request through the full router.
pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
