use std::net::SocketAddr;

use axum::{
    http::{HeaderValue, Method},
    response::Response,
    Router,
};
use color_eyre::eyre::WrapErr;
use tokio::{net::TcpListener, sync::watch};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::state::AppConfig;

pub(crate) mod api;
pub(crate) mod auth;
pub mod errors;
pub(crate) mod routes;
mod trace;

#[cfg(test)]
pub(crate) mod test_helpers;

use errors::ServerError;

pub(crate) type ResponseResult<T = Response> = Result<T, ServerError>;

pub(crate) fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Serves until `shutdown` flips to `true`, then lets in-flight requests finish.
pub(crate) async fn run_server(
    routes: Router,
    app: &AppConfig,
    mut shutdown: watch::Receiver<bool>,
) -> color_eyre::Result<()> {
    let tracer = trace::Tracer;
    let trace_layer = tower_http::trace::TraceLayer::new_for_http()
        .make_span_with(tracer)
        .on_response(tracer);

    let routes = routes.layer(trace_layer).layer(cors_layer(app));

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let port: u16 = port.parse().wrap_err("PORT must be a number")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err("Failed to open port")?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, routes)
        .with_graceful_shutdown(async move {
            // A dropped sender also means shut down.
            let _ = shutdown.wait_for(|stop| *stop).await;
            tracing::info!("HTTP server draining");
        })
        .await
        .wrap_err("Failed to run server")
}
