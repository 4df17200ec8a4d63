//! Module-specific endpoints beyond the five CRUD actions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Extension;
use service::Principal;

use crate::errors::envelope_response;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/currency/default",
    tag = "currency",
    responses(
        (status = 200, description = "The default currency", body = crate::openapi::EnvelopeDoc),
        (status = 404, description = "No default currency configured", body = crate::openapi::ErrorEnvelopeDoc)
    ),
    security(("bearer" = []))
)]
pub async fn default_currency(State(state): State<AppState>) -> Response {
    envelope_response(state.services.currencies.default_currency().await.into_json(), StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/dashboard/statistics",
    tag = "dashboard",
    responses((status = 200, description = "Per-module totals for the caller", body = crate::openapi::DashboardStatisticsDoc)),
    security(("bearer" = []))
)]
pub async fn dashboard_statistics(State(state): State<AppState>, Extension(principal): Extension<Principal>) -> Response {
    envelope_response(state.services.dashboard.statistics(&principal).await.into_json(), StatusCode::OK)
}
