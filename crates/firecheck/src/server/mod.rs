//! HTTP surface.
//!
//! JSON in, JSON out. Sessions ride on a cookie; see [`session`].

pub mod handlers;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{debug, info};

use crate::error::Result;
use crate::station::Station;

pub use handlers::{AdminUpdate, ApiError, LoginForm};
pub use session::{SessionStore, SESSION_COOKIE};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Files and configuration.
    pub station: Arc<Station>,
    /// Logged-in users.
    pub sessions: SessionStore,
}

impl AppState {
    /// State with no sessions. Sessions expire after the configured
    /// `server.session_ttl_secs`.
    #[must_use]
    pub fn new(station: Station) -> Self {
        let sessions = SessionStore::with_ttl(station.config().session_ttl());
        Self {
            station: Arc::new(station),
            sessions,
        }
    }
}

/// All routes. `/static` is mounted only when `server.static_dir` is set.
pub fn router(state: AppState) -> Router {
    let static_dir = state.station.config().server.static_dir.clone();
    let routes = Router::new()
        .route("/", get(handlers::home))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route(
            "/admin",
            get(handlers::admin_page).post(handlers::admin_update),
        )
        .route(
            "/checklists/post-job",
            get(handlers::post_job_form).post(handlers::post_job_submit),
        )
        .route(
            handlers::POST_JOB_SUCCESS_PATH,
            get(handlers::post_job_success),
        )
        .route(
            "/checklists/maintenance-night",
            get(handlers::maintenance_form).post(handlers::maintenance_submit),
        )
        .route("/api/equipment", get(handlers::api_equipment))
        .route("/api/maintenance_tasks", get(handlers::api_maintenance_tasks));

    let routes = match static_dir {
        Some(dir) => {
            debug!(dir = %dir.display(), "serving static files");
            routes.nest_service("/static", ServeDir::new(dir))
        }
        None => routes,
    };
    routes.with_state(state)
}

/// Serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(station: Station, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        data_dir = %station.data_dir().display(),
        "serving"
    );

    let app = router(AppState::new(station));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutting down");
            }
        })
        .await?;
    Ok(())
}
