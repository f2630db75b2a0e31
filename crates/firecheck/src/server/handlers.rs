//! Route handlers.
//!
//! Every handler that needs a logged-in user runs [`require`] before touching
//! any file, so a denied request never reads or writes data. File work on the
//! [`Station`] runs through [`blocking`] so it never stalls a runtime worker.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

use super::session::{clear_cookie, session_id, set_cookie};
use super::AppState;
use crate::access::{authorize, Access, AdminSet, Requirement, SessionUser};
use crate::checklist::{MaintenanceRequest, Outcome, PostJobRequest};
use crate::error::Error;
use crate::reference::ReferenceKind;
use crate::station::Station;

/// Shown when a logged-in non-admin opens the admin page.
pub const FORBIDDEN_MESSAGE: &str = "You don't have permission to access Admin.";

/// Shown when a login attempt fails.
pub const LOGIN_FAILED_MESSAGE: &str =
    "Invalid credentials. If you are having issues logging in, contact a brigade admin.";

/// Path the post-job form redirects to after a successful save.
pub const POST_JOB_SUCCESS_PATH: &str = "/checklists/post-job/success";

/// Why a handler did not produce its normal response.
#[derive(Debug)]
pub enum ApiError {
    /// Not logged in; send to the login page.
    LoginRequired {
        /// Path to return to after logging in.
        next: String,
    },
    /// Logged in but not an admin.
    Forbidden,
    /// Reading or writing data failed.
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::LoginRequired { next } => {
                Redirect::to(&format!("/login?next={}", encode_query_value(&next))).into_response()
            }
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": FORBIDDEN_MESSAGE })),
            )
                .into_response(),
            Self::Internal(err) => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": err.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

type HandlerResult = Result<Response, ApiError>;

/// Run `work` against the station on the blocking thread pool.
async fn blocking<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&Station) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let station = Arc::clone(&state.station);
    tokio::task::spawn_blocking(move || work(&station))
        .await
        .map_err(|e| ApiError::Internal(Error::internal(format!("blocking task failed: {e}"))))?
        .map_err(ApiError::from)
}

/// Check the caller against `requirement`.
async fn require(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    requirement: Requirement,
) -> Result<Option<SessionUser>, ApiError> {
    let user = state.sessions.user_from_headers(headers).await;
    let admins = if requirement == Requirement::Admin && user.is_some() {
        blocking(state, Station::admins).await?
    } else {
        AdminSet::new()
    };

    match authorize(requirement, user.as_ref(), &admins, uri.path()) {
        Access::Allowed => Ok(user),
        Access::RedirectToLogin { next } => {
            debug!(path = %uri.path(), "login required");
            Err(ApiError::LoginRequired { next })
        }
        Access::Forbidden => {
            info!(
                path = %uri.path(),
                user = user.as_ref().map_or("", |u| u.username.as_str()),
                "admin access refused"
            );
            Err(ApiError::Forbidden)
        }
    }
}

/// Percent-encode everything except unreserved characters and `/`.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.~/".contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}

// ----- home and login -----

pub(super) async fn home(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let user = state.sessions.user_from_headers(&headers).await;
    Json(json!({
        "app_name": state.station.config().server.app_name,
        "user": user,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct NextQuery {
    next: Option<String>,
}

/// Credentials posted to `/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    /// Username as typed.
    pub username: String,
    /// Password as typed.
    pub password: String,
}

pub(super) async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> Json<serde_json::Value> {
    Json(json!({
        "app_name": state.station.config().server.app_name,
        "next": query.next,
    }))
}

pub(super) async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Json(form): Json<LoginForm>,
) -> HandlerResult {
    let authenticated = blocking(&state, move |station| {
        station.authenticate(&form.username, &form.password)
    })
    .await?;
    let Some(user) = authenticated else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": LOGIN_FAILED_MESSAGE })),
        )
            .into_response());
    };

    let id = state.sessions.create(user).await;
    let next = safe_next(query.next.as_deref());
    Ok(([(SET_COOKIE, set_cookie(&id))], Redirect::to(next)).into_response())
}

pub(super) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        if let Some(user) = state.sessions.remove(id).await {
            info!(user = %user.username, "logged out");
        }
    }
    ([(SET_COOKIE, clear_cookie())], Redirect::to("/")).into_response()
}

// ----- admin -----

/// Body posted to `/admin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdminUpdate {
    /// Replace the admin list; one username per line.
    Admins {
        /// Newline-separated usernames.
        admins: String,
    },
    /// Replace the crew roster.
    Crew {
        /// New file content.
        content: String,
    },
    /// Replace the equipment list.
    Equipment {
        /// New file content.
        content: String,
    },
    /// Replace the maintenance task list.
    Maintenance {
        /// New file content.
        content: String,
    },
}

pub(super) async fn admin_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Admin).await?;
    Ok(Json(blocking(&state, Station::admin_overview).await?).into_response())
}

pub(super) async fn admin_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(update): Json<AdminUpdate>,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Admin).await?;

    let (message, overview) = blocking(&state, move |station| {
        let message = match update {
            AdminUpdate::Admins { admins } => {
                station.save_admins(admins.lines())?;
                "Admin user list updated.".to_string()
            }
            AdminUpdate::Crew { content } => replace(station, ReferenceKind::Crew, &content)?,
            AdminUpdate::Equipment { content } => {
                replace(station, ReferenceKind::Equipment, &content)?
            }
            AdminUpdate::Maintenance { content } => {
                replace(station, ReferenceKind::Maintenance, &content)?
            }
        };
        Ok((message, station.admin_overview()?))
    })
    .await?;

    Ok(Json(json!({
        "message": message,
        "overview": overview,
    }))
    .into_response())
}

fn replace(station: &Station, kind: ReferenceKind, content: &str) -> Result<String, Error> {
    let path = station.replace_reference(kind, content.as_bytes())?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(format!("Uploaded and replaced {name}."))
}

// ----- checklists -----

pub(super) async fn post_job_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Login).await?;
    Ok(Json(blocking(&state, Station::post_job_form).await?).into_response())
}

pub(super) async fn post_job_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(request): Json<PostJobRequest>,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Login).await?;

    let outcome = blocking(&state, move |station| station.submit_post_job(&request)).await?;
    match outcome {
        Outcome::Persisted(receipt) => {
            let location = format!(
                "{POST_JOB_SUCCESS_PATH}?fname={}",
                encode_query_value(&receipt.file_name)
            );
            Ok(Redirect::to(&location).into_response())
        }
        Outcome::Rejected(rejection) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": rejection.to_string(),
                "rejection": rejection,
                "form": blocking(&state, Station::post_job_form).await?,
            })),
        )
            .into_response()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SuccessQuery {
    fname: Option<String>,
}

pub(super) async fn post_job_success(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<SuccessQuery>,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Login).await?;
    let fname = query.fname.unwrap_or_default();
    Ok(Json(json!({ "message": format!("Saved {fname}") })).into_response())
}

pub(super) async fn maintenance_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Login).await?;
    Ok(Json(blocking(&state, Station::maintenance_form).await?).into_response())
}

pub(super) async fn maintenance_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(request): Json<MaintenanceRequest>,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Login).await?;

    let outcome = blocking(&state, move |station| station.submit_maintenance(&request)).await?;
    match outcome {
        Outcome::Persisted(receipt) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": format!("Maintenance checklist saved: {}", receipt.file_name),
                "file_name": receipt.file_name,
                "rows": receipt.rows,
            })),
        )
            .into_response()),
        Outcome::Rejected(rejection) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": rejection.to_string(),
                "rejection": rejection,
                "form": blocking(&state, Station::maintenance_form).await?,
            })),
        )
            .into_response()),
    }
}

// ----- JSON lookups -----

pub(super) async fn api_equipment(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Login).await?;
    Ok(Json(blocking(&state, Station::equipment).await?).into_response())
}

pub(super) async fn api_maintenance_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> HandlerResult {
    require(&state, &headers, &uri, Requirement::Login).await?;
    Ok(Json(blocking(&state, Station::tasks).await?).into_response())
}
