//! REST API under `/api/v1`.

pub mod extract;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::header::{REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Router, middleware as axum_middleware};
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::AppError;
use routes::{admins, attendance, auth, employees, health, stats};
pub use state::AppState;

pub const API_PREFIX: &str = "/api/v1";

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_allow_origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn not_found() -> Response {
    AppError::not_found("Not Found").into_response()
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/session", get(auth::session))
        .route("/auth/bootstrap", post(auth::bootstrap))
        .route("/auth/admins", post(auth::create_account))
        // Admin accounts
        .route("/admins", get(admins::list).post(admins::create))
        .route(
            "/admins/{id}",
            get(admins::get).patch(admins::update).delete(admins::delete),
        )
        // Employees
        .route("/employees", get(employees::list).post(employees::create))
        .route(
            "/employees/{id}",
            get(employees::get).patch(employees::update).delete(employees::delete),
        )
        // Attendance per employee
        .route(
            "/employees/{id}/attendance",
            get(attendance::list_for_employee).post(attendance::create),
        )
        .route("/employees/{id}/attendance/summary", get(attendance::summary))
        .route("/employees/{id}/attendance/today", put(attendance::upsert_today))
        .route(
            "/employees/{id}/attendance/{attendance_id}",
            get(attendance::get).patch(attendance::update).delete(attendance::delete),
        )
        // Attendance across employees
        .route("/attendance", get(attendance::list_all))
        .route("/attendance/stats", get(attendance::stats))
        .route("/stats/overview", get(stats::overview))
}

/// Build the application router with all middleware.
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .nest(API_PREFIX, api_routes())
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_requests,
        ))
        .layer(cors_layer(&state.config.server))
        .layer(axum_middleware::from_fn_with_state(state.clone(), middleware::check_host))
        .layer(axum_middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let address = state.config.bind_address();
    let pruner = rate_limit::spawn_pruner(state.clone(), Duration::from_secs(60));
    let app = create_router(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pruner.abort();
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
