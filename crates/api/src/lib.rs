//! HTTP API server for the order fulfillment service.
//!
//! Exposes order placement and fulfillment over REST, with structured
//! logging (tracing) and Prometheus metrics. This is the caller-side error
//! boundary for the fulfillment pipeline: terminal business rejections come
//! back in the response body, fatal pipeline errors as error statuses.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use graph::CommerceGraph;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use fulfillment::{CheckoutCoordinator, FulfillmentConfig, FulfillmentOrchestrator};
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<G: CommerceGraph + Clone + 'static>(
    state: Arc<AppState<G>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place::<G>))
        .route("/orders/{id}", get(routes::orders::get::<G>))
        .route(
            "/orders/{id}/fulfillments",
            post(routes::orders::fulfill::<G>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over the given graph client.
pub fn create_state<G: CommerceGraph + Clone + 'static>(
    graph: G,
    config: FulfillmentConfig,
) -> Arc<AppState<G>> {
    Arc::new(AppState {
        checkout: CheckoutCoordinator::new(graph.clone()),
        orchestrator: FulfillmentOrchestrator::new(graph.clone(), config),
        graph,
    })
}
