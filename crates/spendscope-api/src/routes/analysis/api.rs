//! Analysis API endpoints - JSON API
//!
//! Every filter endpoint applies one action to the caller's session and
//! answers with the refreshed analysis view.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use spendscope_core::{coerce_year, AnalysisView, FilterAction, TransactionType};

use crate::{current_view, with_session, ApiError, AppState, Identity};

#[derive(Debug, Deserialize)]
pub struct TypeRequest {
    pub transaction_type: String,
}

/// Year as sent by the client: a number or numeric text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl YearInput {
    pub fn resolve(&self) -> Option<i32> {
        match self {
            YearInput::Int(year) => i32::try_from(*year).ok().filter(|&y| y != 0),
            YearInput::Float(year) => coerce_year(&year.to_string()),
            YearInput::Text(year) => coerce_year(year),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PeriodRequest {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<YearInput>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubcategoryRequest {
    pub subcategory_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartClickRequest {
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub subcategory_id: Option<String>,
}

async fn apply(state: &AppState, headers: &HeaderMap, action: FilterAction) -> Result<Json<AnalysisView>, ApiError> {
    let identity = Identity::from_headers(headers, &state.config);
    with_session(state, &identity, |s| s.dispatch(action)).await??;
    Ok(Json(current_view(state, &identity).await?))
}

/// Current analysis view (JSON API)
pub async fn api_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalysisView>, ApiError> {
    let identity = Identity::from_headers(&headers, &state.config);
    Ok(Json(current_view(&state, &identity).await?))
}

/// Switch between expenses and income
pub async fn api_set_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TypeRequest>,
) -> Result<Json<AnalysisView>, ApiError> {
    let transaction_type: TransactionType = body
        .transaction_type
        .parse()
        .map_err(|message| ApiError::BadRequest { message })?;
    apply(&state, &headers, FilterAction::SetTransactionType { transaction_type }).await
}

/// Set the month/year filter; blank or zero values clear it
pub async fn api_set_period(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PeriodRequest>,
) -> Result<Json<AnalysisView>, ApiError> {
    let year = body.year.as_ref().and_then(YearInput::resolve);
    apply(&state, &headers, FilterAction::SetPeriod { month: body.month, year }).await
}

pub async fn api_select_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<AnalysisView>, ApiError> {
    apply(&state, &headers, FilterAction::SelectCategory { category_id: body.category_id }).await
}

pub async fn api_select_subcategory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubcategoryRequest>,
) -> Result<Json<AnalysisView>, ApiError> {
    apply(&state, &headers, FilterAction::SelectSubcategory { subcategory_id: body.subcategory_id }).await
}

/// Chart slice clicked
pub async fn api_chart_click(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ChartClickRequest>,
) -> Result<Json<AnalysisView>, ApiError> {
    let action = FilterAction::ChartSelection {
        category_id: body.category_id,
        subcategory_id: body.subcategory_id,
    };
    apply(&state, &headers, action).await
}

pub async fn api_back(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<AnalysisView>, ApiError> {
    apply(&state, &headers, FilterAction::Back).await
}

pub async fn api_clear(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<AnalysisView>, ApiError> {
    apply(&state, &headers, FilterAction::ClearFilters).await
}
