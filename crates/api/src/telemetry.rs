use axum::http::HeaderValue;
use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::HttpMakeClassifier;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Request tracing, CORS and a body cap, all tunable through the same
/// `TIMETABLE__SERVER__*` environment the listener port comes from.
pub fn stack() -> ServiceBuilder<
    Stack<CorsLayer, Stack<TraceLayer<HttpMakeClassifier>, Stack<RequestBodyLimitLayer, Identity>>>,
> {
    ServiceBuilder::new()
        .layer(RequestBodyLimitLayer::new(body_limit()))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}

/// Comma-separated allowed origins; unset means any origin (the UI and
/// the engine usually share a host in deployments, but dev setups do not).
fn cors() -> CorsLayer {
    match std::env::var("TIMETABLE__SERVER__CORS_ORIGINS") {
        Ok(raw) => {
            let origins: Vec<HeaderValue> = raw
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        Err(_) => CorsLayer::permissive(),
    }
}

fn body_limit() -> usize {
    std::env::var("TIMETABLE__SERVER__BODY_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_BODY_LIMIT)
}
