//! Transactions API endpoints - JSON API
//!
//! Endpoints:
//! - api_transactions: Transactions matching the current filters
//! - api_add_transaction: Record a manual transaction
//! - api_reload_transactions: Re-read the source and fetch the collection again

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;
use spendscope_core::{AnalysisView, CoreError, Transaction, TransactionDraft};

use crate::{current_view, refresh_session, with_session, ApiError, AppState, Identity};

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub count: usize,
    pub total: Decimal,
}

/// Transactions matching the current filters (JSON API)
pub async fn api_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let identity = Identity::from_headers(&headers, &state.config);
    let view = current_view(&state, &identity).await?;
    Ok(Json(TransactionsResponse {
        count: view.transaction_count,
        total: view.total,
        transactions: view.transactions,
    }))
}

/// Record a manually entered transaction and prepend it to the session
pub async fn api_add_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<TransactionDraft>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let identity = Identity::from_headers(&headers, &state.config);
    let demo_mode = with_session(&state, &identity, |s| s.demo_mode()).await?;

    let transaction = if demo_mode {
        let user = identity
            .user_id
            .as_deref()
            .unwrap_or(state.config.session.demo_user_id.as_str());
        state.demo_source.add_transaction(user, draft).await?
    } else {
        let user = identity.user_id.as_deref().ok_or(CoreError::MissingIdentity)?;
        state.source.add_transaction(user, draft).await?
    };

    log::info!("Added transaction {} ({})", transaction.id, transaction.merchant_name);
    with_session(&state, &identity, |s| s.add_local(transaction.clone())).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Re-read the backing store and fetch the transaction collection again
///
/// Manual additions that only lived in memory are dropped.
pub async fn api_reload_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalysisView>, ApiError> {
    let identity = Identity::from_headers(&headers, &state.config);
    let demo_mode = with_session(&state, &identity, |s| s.demo_mode()).await?;
    let source = if demo_mode { &state.demo_source } else { &state.source };
    source.reload().await?;
    refresh_session(&state, &identity).await?;
    Ok(Json(current_view(&state, &identity).await?))
}
