pub mod error;
pub mod registry;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(data_dir: PathBuf) -> Router {
    router_with_state(state::AppState::new(data_dir))
}

/// Same as [`build_router`] but over caller-provided state, so tests can
/// seed the run registry before issuing requests.
pub fn router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Settings
        .route("/api/settings/status", get(routes::settings::get_status))
        .route(
            "/api/settings/global",
            get(routes::settings::get_global).put(routes::settings::update_global),
        )
        .route(
            "/api/settings/credentials",
            get(routes::settings::get_credentials).put(routes::settings::update_credentials),
        )
        .route(
            "/api/settings/project",
            post(routes::settings::get_project).put(routes::settings::update_project),
        )
        .route("/api/settings/migrate", post(routes::settings::migrate))
        // Running generations
        .route("/api/running-agents", get(routes::running::list_running))
        .route("/api/running-agents/stop", post(routes::running::stop_run))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the settings API server on `port`.
pub async fn serve(data_dir: PathBuf, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(data_dir, listener).await
}

/// Start the server on a pre-bound listener (port 0 in tests).
pub async fn serve_on(data_dir: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    tracing::info!(
        data_dir = %data_dir.display(),
        "automaker server listening on http://localhost:{actual_port}"
    );
    let app = build_router(data_dir);
    axum::serve(listener, app).await?;
    Ok(())
}
