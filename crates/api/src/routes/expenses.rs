//! Expense submission, listing and approval routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use spendflow_core::expense::{Expense, NewExpense, Scope};
use spendflow_core::workflow::Decision;
use spendflow_shared::types::ExpenseId;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the expense routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(submit_expense).get(list_expenses))
        .route("/expenses/{id}", get(get_expense))
        .route("/expenses/{id}/approve", post(approve_expense))
        .route("/expenses/{id}/reject", post(reject_expense))
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// `mine`, `queue` or `all`; defaults by role.
    pub scope: Option<Scope>,
}

/// Optional body for approve/reject.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    /// Free-text note stored with the decision.
    pub comment: Option<String>,
}

/// Response for expense listings.
#[derive(Debug, Serialize)]
pub struct ExpenseListResponse {
    /// Matching expenses, newest first.
    pub expenses: Vec<Expense>,
    /// Number of expenses returned.
    pub total: usize,
}

/// POST `/expenses` - Submit an expense.
async fn submit_expense(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<NewExpense>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = state.expenses.submit(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET `/expenses` - List expenses visible to the caller.
async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(query): Query<ListExpensesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let expenses = state.expenses.list_for(&identity, query.scope).await?;
    Ok(Json(ExpenseListResponse {
        total: expenses.len(),
        expenses,
    }))
}

/// GET `/expenses/{id}` - Get one expense.
async fn get_expense(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = state
        .expenses
        .get(ExpenseId::from_uuid(id), &identity)
        .await?;
    Ok(Json(expense))
}

/// POST `/expenses/{id}/approve` - Approve at the current level.
async fn approve_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<DecisionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    decide(&state, &auth, id, Decision::Approve, body).await
}

/// POST `/expenses/{id}/reject` - Reject at the current level.
async fn reject_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<DecisionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    decide(&state, &auth, id, Decision::Reject, body).await
}

async fn decide(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    decision: Decision,
    body: Option<Json<DecisionRequest>>,
) -> Result<Json<Expense>, ApiError> {
    let comment = body.and_then(|Json(request)| request.comment);
    let expense = state
        .expenses
        .decide(ExpenseId::from_uuid(id), auth.identity(), decision, comment)
        .await?;
    Ok(Json(expense))
}
