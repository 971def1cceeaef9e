//! API request handlers.

use axum::{Json, extract::State, response::Html};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument};

use crate::host::{HostAction, PowerAction};
use crate::net;
use crate::notifications::NotificationRecord;
use crate::smart_home::{SmartHomeState, SmartHomeUpdate};

use super::error::{ApiError, ApiResult};
use super::extract::JsonBody;
use super::state::AppState;

const MOBILE_PAGE: &str = include_str!("../../static/mobile.html");

/// Distinguishes an absent field (`None`) from one sent as `null`
/// (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub bridge_ready: bool,
    pub mobile_url: String,
}

/// Liveness plus the URL phones should open.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let host = net::advertised_host(state.settings.advertise_host.as_deref());
    Json(StatusResponse {
        status: "Online",
        version: env!("CARGO_PKG_VERSION"),
        bridge_ready: true,
        mobile_url: net::mobile_url(&host, state.settings.port),
    })
}

// ============================================================================
// Print
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PrintRequest {
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    pub message: String,
}

#[instrument(skip(state))]
pub async fn print_file(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PrintRequest>,
) -> ApiResult<Json<PrintResponse>> {
    let path = request
        .path
        .unwrap_or_else(|| state.settings.default_print_path.clone());

    state
        .host
        .dispatch(HostAction::Print { path: path.clone() })
        .await?;

    Ok(Json(PrintResponse {
        success: true,
        message: format!("Sent {path} to default printer."),
    }))
}

// ============================================================================
// Shell commands
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    pub executed: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyCommandRequest {
    pub cmd: Option<String>,
}

/// Run a shell command and wait for it. The exit status is not reported.
#[instrument(skip(state))]
pub async fn legacy_command(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LegacyCommandRequest>,
) -> ApiResult<Json<CommandResponse>> {
    let command = request
        .cmd
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing 'cmd'"))?;

    state
        .host
        .dispatch(HostAction::RunCommand {
            command: command.clone(),
        })
        .await?;

    Ok(Json(CommandResponse {
        success: true,
        executed: command,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunRequest {
    #[serde(deserialize_with = "present")]
    pub command: Option<Option<String>>,
    pub cmd: Option<String>,
}

/// Start a shell command in the background.
#[instrument(skip(state))]
pub async fn run_command(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RunRequest>,
) -> ApiResult<Json<CommandResponse>> {
    // A present `command` key wins, even when it is null or empty.
    let command = match request.command {
        Some(command) => command,
        None => request.cmd,
    }
    .filter(|c| !c.is_empty())
    .ok_or_else(|| ApiError::bad_request("Missing 'command'"))?;

    state
        .host
        .dispatch(HostAction::SpawnCommand {
            command: command.clone(),
        })
        .await?;

    Ok(Json(CommandResponse {
        success: true,
        executed: command,
    }))
}

// ============================================================================
// Applications and power
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpenAppRequest {
    #[serde(deserialize_with = "present")]
    pub app: Option<Option<String>>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OpenAppResponse {
    pub success: bool,
    pub opened: String,
}

#[instrument(skip(state))]
pub async fn open_app(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<OpenAppRequest>,
) -> ApiResult<Json<OpenAppResponse>> {
    let app = match request.app {
        Some(app) => app,
        None => request.name,
    }
    .map(|a| a.trim().to_string())
    .filter(|a| !a.is_empty())
    .ok_or_else(|| ApiError::bad_request("Missing 'app' or 'name'"))?;

    state
        .host
        .dispatch(HostAction::OpenApp { app: app.clone() })
        .await?;

    Ok(Json(OpenAppResponse {
        success: true,
        opened: app,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PowerRequest {
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PowerResponse {
    pub success: bool,
    pub action: String,
}

/// Shut down or restart the host.
///
/// The lowercased action is echoed back even when it is not one of the two
/// known values and was therefore treated as "shutdown".
#[instrument(skip(state))]
pub async fn power(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PowerRequest>,
) -> ApiResult<Json<PowerResponse>> {
    let action = request
        .action
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "shutdown".to_string())
        .to_lowercase();

    let power_action = PowerAction::parse(&action);
    info!("Power request: {} ({})", action, power_action);
    state.host.dispatch(HostAction::Power(power_action)).await?;

    Ok(Json(PowerResponse {
        success: true,
        action,
    }))
}

// ============================================================================
// Smart home
// ============================================================================

pub async fn smart_home_state() -> Json<SmartHomeState> {
    Json(SmartHomeState::snapshot())
}

#[derive(Debug, Serialize)]
pub struct SmartHomeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub requested: SmartHomeUpdate,
}

/// Accept switch changes. Nothing is stored yet; the request is echoed.
pub async fn smart_home_control(
    JsonBody(update): JsonBody<SmartHomeUpdate>,
) -> Json<SmartHomeResponse> {
    info!(?update, "Smart home update");
    Json(SmartHomeResponse {
        success: true,
        requested: update,
    })
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationRecord>,
}

/// Hand every pending notification to the caller and forget them.
pub async fn take_notifications(State(state): State<AppState>) -> Json<NotificationsResponse> {
    let notifications = state.notifications.drain_all().await;
    if !notifications.is_empty() {
        info!("Delivering {} notification(s)", notifications.len());
    }
    Json(NotificationsResponse { notifications })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendNotificationRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub async fn send_notification(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SendNotificationRequest>,
) -> Json<SuccessResponse> {
    let title = request
        .title
        .unwrap_or_else(|| state.settings.default_notification_title.clone());
    let body = request.body.unwrap_or_default();

    info!(title = %title, "Queued notification");
    state
        .notifications
        .append(NotificationRecord::new(title, body))
        .await;

    Json(SuccessResponse { success: true })
}

// ============================================================================
// Mobile page
// ============================================================================

pub async fn mobile_page() -> Html<&'static str> {
    Html(MOBILE_PAGE)
}
