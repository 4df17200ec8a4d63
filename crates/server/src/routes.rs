use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use common::types::Health;
use service::modules::{
    currency::Currency, funding::Funding, investment::Investment, payment::Payment, pricing::Pricing,
    transaction::Transaction, withdrawal::Withdrawal,
};
use service::Resource;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::require_bearer;
use crate::controller::{self, Controller};
use crate::errors::ApiError;
use crate::extensions;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::transformers::WithdrawalTransformer;

const MODULES: [&str; 7] = [
    Currency::MODULE,
    Pricing::MODULE,
    Investment::MODULE,
    Funding::MODULE,
    Payment::MODULE,
    Withdrawal::MODULE,
    Transaction::MODULE,
];

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Liveness", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> { Json(Health::ok()) }

/// The five CRUD routes for `R`, plus `complete` when the resource has a terminal status.
pub fn resource_routes<R: Resource>(controller: Controller<R>) -> Router {
    let collection = format!("/{}", R::MODULE);
    let item = format!("/{}/:id", R::MODULE);
    let mut router = Router::new()
        .route(&collection, get(controller::index::<R>).post(controller::store::<R>))
        .route(
            &item,
            get(controller::show::<R>)
                .put(controller::update::<R>)
                .patch(controller::update::<R>)
                .delete(controller::destroy::<R>),
        );
    if R::completion().is_some() {
        router = router.route(&format!("/{}/:id/complete", R::MODULE), post(controller::complete::<R>));
    }
    router.with_state(controller)
}

fn module_health_routes() -> Router {
    MODULES.iter().fold(Router::new(), |router, &module| {
        router.route(&format!("/{}/health", module), get(move || async move { Json(Health::for_module(module)) }))
    })
}

async fn fallback() -> ApiError { ApiError::route_not_found() }

/// Build the full application router: public health and docs, bearer-protected modules.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let services = &state.services;
    let limits = state.pagination;

    let public = Router::new()
        .route("/health", get(health))
        .merge(module_health_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let protected = Router::new()
        .merge(resource_routes(Controller::new(services.currencies.clone(), limits)))
        .merge(resource_routes(Controller::new(services.pricings.clone(), limits)))
        .merge(resource_routes(Controller::new(services.investments.clone(), limits)))
        .merge(resource_routes(Controller::new(services.fundings.clone(), limits)))
        .merge(resource_routes(Controller::new(services.payments.clone(), limits)))
        .merge(resource_routes(
            Controller::new(services.withdrawals.clone(), limits).with_transformer(Arc::new(WithdrawalTransformer)),
        ))
        .merge(resource_routes(Controller::new(services.transactions.clone(), limits)))
        .merge(
            Router::new()
                .route("/currency/default", get(extensions::default_currency))
                .route("/dashboard/statistics", get(extensions::dashboard_statistics))
                .with_state(state.clone()),
        )
        .route_layer(middleware::from_fn_with_state(state.auth.clone(), require_bearer));

    public.merge(protected).fallback(fallback).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                    .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
            )
            .layer(cors),
    )
}
