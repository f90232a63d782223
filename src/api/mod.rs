pub mod error;
pub mod health;
pub mod leads;
pub mod response;
pub mod roi;
pub mod twin;
pub mod v1;

use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::warn;

use crate::controller::AppState;

pub fn router(state: AppState) -> Router {
    let server = state.cfg.server.clone();
    let mut router = Router::new().nest("/api/v1", v1::router(state));

    if server.enable_cors {
        use tower_http::cors::AllowOrigin;
        match server.cors_origin.parse() {
            Ok(origin) => {
                let cors = CorsLayer::new()
                    .allow_origin(AllowOrigin::exact(origin))
                    .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                    .allow_headers([axum::http::header::CONTENT_TYPE]);
                router = router.layer(cors);
            }
            Err(_) => warn!(origin = %server.cors_origin, "invalid CORS origin, CORS disabled"),
        }
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs))),
        )
        .layer(TraceLayer::new_for_http())
}
