//! Exchange rate routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use spendflow_core::currency::{CurrencyError, ExchangeRateTable};
use spendflow_shared::AppError;
use spendflow_shared::types::CurrencyCode;
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the exchange rate routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exchange-rates", get(current_rates))
        .route("/exchange-rates/refresh", post(refresh_rates))
        .route("/exchange-rates/convert", get(convert_amount))
}

/// Query parameters for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Amount in `from`.
    pub amount: Decimal,
    /// Source currency code.
    pub from: String,
    /// Target currency code; defaults to the base currency.
    pub to: Option<String>,
}

/// GET `/exchange-rates` - The table conversions currently use.
async fn current_rates(State(state): State<AppState>, _auth: AuthUser) -> Json<ExchangeRateTable> {
    let table = state.converter.snapshot().await;
    Json(ExchangeRateTable::clone(&table))
}

/// POST `/exchange-rates/refresh` - Fetch a fresh base table. Admin only.
async fn refresh_rates(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    if !identity.role.is_admin() {
        return Err(
            AppError::Forbidden("only admins can refresh exchange rates".to_string()).into(),
        );
    }

    let table = state.converter.refresh().await?;
    info!(
        user_id = %identity.user_id,
        currencies = table.len(),
        "Exchange rates refreshed on request"
    );
    Ok(Json(ExchangeRateTable::clone(&table)))
}

/// GET `/exchange-rates/convert` - Convert an amount with the current table.
///
/// Read-only: a missing rate is a 502 and never triggers a fetch.
async fn convert_amount(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ConvertQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let from = CurrencyCode::parse(&query.from).map_err(CurrencyError::from)?;
    let to = match query.to.as_deref() {
        Some(code) => CurrencyCode::parse(code).map_err(CurrencyError::from)?,
        None => state.converter.base_currency().clone(),
    };

    let conversion = state.converter.quote(query.amount, &from, &to).await?;
    Ok(Json(conversion))
}
