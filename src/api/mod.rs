//! REST API layer: route handlers, DTOs, identity extraction and router
//! composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` and `/ws` live
//! at the root.

pub mod auth;
pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "slot-swapper", description = "Calendar slot swap marketplace"),
    paths(
        handlers::system::health_handler,
        handlers::events::list_events,
        handlers::events::create_event,
        handlers::events::upcoming_events,
        handlers::events::update_event,
        handlers::events::update_status,
        handlers::events::delete_event,
        handlers::swaps::swappable_slots,
        handlers::swaps::request_swap,
        handlers::swaps::get_request,
        handlers::swaps::respond_to_swap,
        handlers::swaps::incoming_requests,
        handlers::swaps::outgoing_requests,
    ),
    components(schemas(crate::error::ErrorResponse, crate::error::ErrorBody)),
    tags(
        (name = "Events", description = "The caller's calendar"),
        (name = "Swaps", description = "Marketplace and swap negotiation"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, docs and middleware.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router().route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    with_middleware(router, request_timeout).with_state(state)
}

/// Wraps `router` in tracing, CORS and a request timeout answering `408`.
fn with_middleware(router: Router<AppState>, request_timeout: Duration) -> Router<AppState> {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout,
            )),
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::persistence::{MemoryStore, SwapStore};

    #[tokio::test]
    async fn slow_request_times_out_with_408() {
        let store: Arc<dyn SwapStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(store, &AppConfig::default());
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "done"
            }),
        );
        let app = with_middleware(slow, Duration::from_millis(20)).with_state(state);

        let Ok(request) = Request::builder().uri("/slow").body(Body::empty()) else {
            panic!("bad request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router failed");
        };
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn openapi_lists_swap_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/swaps/requests"));
        assert!(doc.paths.paths.contains_key("/api/v1/events/{id}/status"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
