// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod live;
mod session;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use clap::Parser;
use clubhub_api::{
    ActivityHistoryResponse, ActivityInfo, ActivityWriteResponse, ApiError,
    AttendanceSummaryResponse, AuthenticatedActor, AuthenticationService,
    CheckSlotOverlapRequest, CheckSlotOverlapResponse, CreateUserRequest, CreateUserResponse,
    DeleteParticipantRequest, IssueSessionRequest, IssueSessionResponse, ListActivitiesResponse,
    ListNotificationsResponse, ListUsersResponse, MarkNotificationReadResponse,
    ParticipantRequest, RecordAttendanceRequest, RegistrationRateRequest,
    RegistrationRateResponse, RegistrationRequest, SaveActivityRequest, SearchMembersRequest,
    TransitionStatusRequest,
};
use clubhub_audit::Cause;
use clubhub_domain::{SlotConflict, User, UserRole};
use clubhub_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use crate::session::{BearerToken, SessionUser};

/// ClubHub Server - HTTP server for club activity management
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Bearer token for the seeded admin account. A random token is
    /// generated and logged when absent.
    #[arg(long)]
    admin_token: Option<String>,

    /// Lifetime of issued sessions, in hours
    #[arg(long, default_value_t = 24)]
    session_ttl_hours: u32,
}

/// Application state shared across handlers.
///
/// The single `SQLite` connection sits behind a Mutex so every request's
/// read-validate-write sequence runs alone.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Live change feed.
    live: Arc<LiveEventBroadcaster>,
    /// Lifetime of sessions issued without an explicit TTL.
    session_ttl: Duration,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.live)
    }
}

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

const fn ok<T>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Error envelope: `{"success": false, "error": ..., "conflicts": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorBody {
    success: bool,
    error: String,
    /// Present only for slot overlap conflicts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conflicts: Vec<SlotConflict>,
}

impl ErrorBody {
    const fn new(error: String) -> Self {
        Self {
            success: false,
            error,
            conflicts: Vec::new(),
        }
    }
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    status: StatusCode,
    message: String,
    conflicts: Vec<SlotConflict>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorBody> = Json(ErrorBody {
            success: false,
            error: self.message,
            conflicts: self.conflicts,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let message: String = err.to_string();
        let (status, conflicts): (StatusCode, Vec<SlotConflict>) = match err {
            ApiError::AuthenticationFailed { .. } => (StatusCode::UNAUTHORIZED, Vec::new()),
            ApiError::Unauthorized { .. } => (StatusCode::FORBIDDEN, Vec::new()),
            ApiError::DomainRuleViolation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, Vec::new())
            }
            ApiError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, Vec::new()),
            ApiError::ResourceNotFound { .. } => (StatusCode::NOT_FOUND, Vec::new()),
            ApiError::Conflict { conflicts, .. } => (StatusCode::CONFLICT, conflicts),
            ApiError::Internal { .. } => {
                error!(error = %message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
            }
        };
        Self {
            status,
            message,
            conflicts,
        }
    }
}

fn request_cause(action: &str, actor: &AuthenticatedActor) -> Cause {
    Cause::new(
        format!("http-{action}"),
        format!("{action} requested by user {}", actor.user_id),
    )
}

/// Tells live clients that an activity changed.
fn announce(state: &AppState, response: &ActivityWriteResponse) {
    state.live.broadcast(&LiveEvent::ActivityChanged {
        activity_id: response.activity.activity_id,
        action: response.action.clone(),
    });
}

// ============================================================================
// Activities
// ============================================================================

async fn handle_list_activities(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<Envelope<ListActivitiesResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListActivitiesResponse = clubhub_api::list_activities(&mut persistence, &actor)?;
    Ok(ok(response))
}

async fn handle_create_activity(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<SaveActivityRequest>,
) -> Result<Json<Envelope<ActivityWriteResponse>>, HttpError> {
    info!(user_id = actor.user_id, name = %req.name, "Handling create_activity request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityWriteResponse = clubhub_api::create_activity(
        &mut persistence,
        req,
        &actor,
        request_cause("create_activity", &actor),
    )?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::ActivityCreated {
        activity_id: response.activity.activity_id,
    });
    Ok(ok(response))
}

async fn handle_get_activity(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
) -> Result<Json<Envelope<ActivityInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityInfo = clubhub_api::get_activity(&mut persistence, activity_id, &actor)?;
    Ok(ok(response))
}

async fn handle_update_activity(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
    Json(req): Json<SaveActivityRequest>,
) -> Result<Json<Envelope<ActivityWriteResponse>>, HttpError> {
    info!(user_id = actor.user_id, activity_id, "Handling update_activity request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityWriteResponse = clubhub_api::update_activity(
        &mut persistence,
        activity_id,
        req,
        &actor,
        request_cause("update_activity", &actor),
    )?;
    drop(persistence);

    announce(&app_state, &response);
    Ok(ok(response))
}

async fn handle_transition_status(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
    Json(req): Json<TransitionStatusRequest>,
) -> Result<Json<Envelope<ActivityWriteResponse>>, HttpError> {
    info!(
        user_id = actor.user_id,
        activity_id,
        status = %req.status,
        "Handling transition_status request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityWriteResponse = clubhub_api::transition_status(
        &mut persistence,
        activity_id,
        &req,
        &actor,
        request_cause("transition_status", &actor),
    )?;
    drop(persistence);

    announce(&app_state, &response);
    Ok(ok(response))
}

// ============================================================================
// Registration & participants
// ============================================================================

async fn handle_update_registration(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Path(activity_id): Path<i64>,
    Json(req): Json<RegistrationRequest>,
) -> Result<Json<Envelope<ActivityWriteResponse>>, HttpError> {
    info!(user_id = actor.user_id, activity_id, request = ?req, "Handling registration request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityWriteResponse = clubhub_api::update_registration(
        &mut persistence,
        activity_id,
        &req,
        &actor,
        &user,
        request_cause("update_registration", &actor),
    )?;
    drop(persistence);

    announce(&app_state, &response);
    Ok(ok(response))
}

async fn handle_manage_participant(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
    Json(req): Json<ParticipantRequest>,
) -> Result<Json<Envelope<ActivityWriteResponse>>, HttpError> {
    info!(user_id = actor.user_id, activity_id, request = ?req, "Handling participant request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityWriteResponse = clubhub_api::manage_participant(
        &mut persistence,
        activity_id,
        req,
        &actor,
        request_cause("manage_participant", &actor),
    )?;
    drop(persistence);

    announce(&app_state, &response);
    Ok(ok(response))
}

async fn handle_delete_participant(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
    Query(req): Query<DeleteParticipantRequest>,
) -> Result<Json<Envelope<ActivityWriteResponse>>, HttpError> {
    info!(
        user_id = actor.user_id,
        activity_id,
        participant = req.user_id,
        "Handling delete_participant request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityWriteResponse = clubhub_api::delete_participant(
        &mut persistence,
        activity_id,
        &req,
        &actor,
        request_cause("delete_participant", &actor),
    )?;
    drop(persistence);

    announce(&app_state, &response);
    Ok(ok(response))
}

async fn handle_check_slot_overlap(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<CheckSlotOverlapRequest>,
) -> Result<Json<Envelope<CheckSlotOverlapResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CheckSlotOverlapResponse =
        clubhub_api::check_slot_overlap(&mut persistence, &req, &actor)?;
    Ok(ok(response))
}

async fn handle_registration_rate(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
    Query(req): Query<RegistrationRateRequest>,
) -> Result<Json<Envelope<RegistrationRateResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RegistrationRateResponse =
        clubhub_api::get_registration_rate(&mut persistence, activity_id, &req, &actor)?;
    Ok(ok(response))
}

// ============================================================================
// Attendance & history
// ============================================================================

/// Query parameters for the attendance summary.
#[derive(Debug, Default, Deserialize)]
struct AttendanceQuery {
    /// `csv` for a CSV download, JSON otherwise.
    #[serde(default)]
    format: Option<String>,
}

async fn handle_get_attendance(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;

    if query.format.as_deref() == Some("csv") {
        let csv: String = clubhub_api::export_attendance_csv(&mut persistence, activity_id, &actor)?;
        let disposition: String =
            format!("attachment; filename=\"attendance-{activity_id}.csv\"");
        return Ok((
            [
                (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response());
    }

    let response: AttendanceSummaryResponse =
        clubhub_api::get_attendance_summary(&mut persistence, activity_id, &actor)?;
    Ok(ok(response).into_response())
}

async fn handle_record_attendance(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
    Json(req): Json<RecordAttendanceRequest>,
) -> Result<Json<Envelope<ActivityWriteResponse>>, HttpError> {
    info!(
        user_id = actor.user_id,
        activity_id,
        participant = req.user_id,
        status = %req.status,
        "Handling record_attendance request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityWriteResponse = clubhub_api::record_attendance(
        &mut persistence,
        activity_id,
        &req,
        &actor,
        request_cause("record_attendance", &actor),
    )?;
    drop(persistence);

    announce(&app_state, &response);
    Ok(ok(response))
}

async fn handle_get_history(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(activity_id): Path<i64>,
) -> Result<Json<Envelope<ActivityHistoryResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ActivityHistoryResponse =
        clubhub_api::get_activity_history(&mut persistence, activity_id, &actor)?;
    Ok(ok(response))
}

// ============================================================================
// Notifications
// ============================================================================

/// Query parameters for listing notifications.
#[derive(Debug, Default, Deserialize)]
struct NotificationsQuery {
    #[serde(default)]
    unread_only: bool,
}

async fn handle_list_notifications(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Envelope<ListNotificationsResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListNotificationsResponse =
        clubhub_api::list_notifications(&mut persistence, &actor, query.unread_only)?;
    Ok(ok(response))
}

async fn handle_mark_notification_read(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<Envelope<MarkNotificationReadResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MarkNotificationReadResponse =
        clubhub_api::mark_notification_read(&mut persistence, notification_id, &actor)?;
    Ok(ok(response))
}

// ============================================================================
// Users & sessions
// ============================================================================

async fn handle_responsible_persons(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<Envelope<ListUsersResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListUsersResponse =
        clubhub_api::list_responsible_persons(&mut persistence, &actor)?;
    Ok(ok(response))
}

async fn handle_search_members(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Query(req): Query<SearchMembersRequest>,
) -> Result<Json<Envelope<ListUsersResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListUsersResponse = clubhub_api::search_members(&mut persistence, &req, &actor)?;
    Ok(ok(response))
}

async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<Envelope<CreateUserResponse>>, HttpError> {
    info!(
        user_id = actor.user_id,
        login_name = %req.login_name,
        role = %req.role,
        "Handling create_user request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateUserResponse = clubhub_api::create_user(
        &mut persistence,
        req,
        &actor,
        request_cause("create_user", &actor),
    )?;
    Ok(ok(response))
}

async fn handle_issue_session(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(user_id): Path<i64>,
    Json(req): Json<IssueSessionRequest>,
) -> Result<Json<Envelope<IssueSessionResponse>>, HttpError> {
    info!(user_id = actor.user_id, target = user_id, "Handling issue_session request");

    let mut persistence = app_state.persistence.lock().await;
    let response: IssueSessionResponse = clubhub_api::issue_session(
        &mut persistence,
        user_id,
        &req,
        app_state.session_ttl,
        &actor,
        request_cause("issue_session", &actor),
    )?;
    Ok(ok(response))
}

/// Response body for logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogoutResponse {
    message: String,
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Envelope<LogoutResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    clubhub_api::logout(&mut persistence, &token)?;
    Ok(ok(LogoutResponse {
        message: String::from("Logged out"),
    }))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/activities",
            get(handle_list_activities).post(handle_create_activity),
        )
        .route(
            "/api/activities/check-slot-overlap",
            post(handle_check_slot_overlap),
        )
        .route(
            "/api/activities/{id}",
            get(handle_get_activity).put(handle_update_activity),
        )
        .route(
            "/api/activities/{id}/status",
            patch(handle_transition_status),
        )
        .route(
            "/api/activities/{id}/register",
            patch(handle_update_registration),
        )
        .route(
            "/api/activities/{id}/participants",
            patch(handle_manage_participant).delete(handle_delete_participant),
        )
        .route(
            "/api/activities/{id}/registration-rate",
            get(handle_registration_rate),
        )
        .route(
            "/api/activities/{id}/attendance",
            get(handle_get_attendance).post(handle_record_attendance),
        )
        .route("/api/activities/{id}/history", get(handle_get_history))
        .route("/api/notifications", get(handle_list_notifications))
        .route(
            "/api/notifications/{id}/read",
            patch(handle_mark_notification_read),
        )
        .route(
            "/api/users/responsible-persons",
            get(handle_responsible_persons),
        )
        .route("/api/members", get(handle_search_members))
        .route("/api/users", post(handle_create_user))
        .route("/api/users/{id}/sessions", post(handle_issue_session))
        .route("/api/logout", post(handle_logout))
        .route("/api/live", get(live_events_handler))
        .with_state(app_state)
}

/// Makes sure an admin account exists and holds a session for `token`.
///
/// Restarting against the same database with the same token reuses the
/// stored session while it is live. An expired session, or one owned by
/// another account, is replaced.
fn seed_admin_session(
    persistence: &mut Persistence,
    token: &str,
    ttl: Duration,
) -> Result<i64, Box<dyn std::error::Error>> {
    let admin_id: i64 = match persistence.get_user_by_login("admin")? {
        Some(user) => user.user_id.ok_or("stored admin has no id")?,
        None => {
            let admin: User = User {
                user_id: None,
                login_name: String::from("admin"),
                display_name: String::from("Administrator"),
                email: String::from("admin@localhost"),
                role: UserRole::Admin,
                student_code: None,
                class_name: None,
            };
            let id: i64 = persistence.create_user(&admin)?;
            info!(user_id = id, "Created admin account");
            id
        }
    };

    let pruned: usize = persistence.delete_expired_sessions()?;
    if pruned > 0 {
        info!(pruned, "Removed expired sessions");
    }

    match persistence.get_session_by_token(token)? {
        Some(session) if session.user_id == admin_id => return Ok(admin_id),
        Some(session) => {
            info!(user_id = session.user_id, "Admin token held by another account, reissuing");
            persistence.delete_session(token)?;
        }
        None => {}
    }
    AuthenticationService::issue_session_with_token(persistence, admin_id, token, ttl)?;
    Ok(admin_id)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing ClubHub Server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    persistence.verify_foreign_key_enforcement()?;

    let session_ttl: Duration = Duration::hours(i64::from(args.session_ttl_hours));
    let admin_token: String = match args.admin_token {
        Some(token) => token,
        None => {
            let token: String = AuthenticationService::generate_session_token();
            info!(token = %token, "Generated admin session token");
            token
        }
    };
    let admin_id: i64 = seed_admin_session(&mut persistence, &admin_token, session_ttl)?;
    info!(user_id = admin_id, "Admin session ready");

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        live: Arc::new(LiveEventBroadcaster::new()),
        session_ttl,
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
