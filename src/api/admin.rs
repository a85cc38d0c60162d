//! Admin API endpoints
//!
//! Review and payout administration. Every route resolves the admin
//! capability from the profiles table via the `AdminUser` extractor;
//! client input never carries a role claim.

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, post},
};

use super::converters::*;
use super::creator::{build_ledger_service, build_submission_service, build_withdrawal_service};
use super::dto::*;
use crate::AppState;
use crate::auth::AdminUser;
use crate::data::ReviewStatus;
use crate::error::AppError;
use crate::service::WithdrawalAction;

/// Create admin router
///
/// Routes:
/// - GET  /users - All registered profiles
/// - GET  /channels - All channel submissions
/// - POST /channels/:id/review - Approve/reject a channel
/// - GET  /shorts - All short submissions
/// - POST /shorts/:id/review - Approve/reject a short
/// - POST /shorts/:id/metrics - Set views and per-view rate (accrues earnings)
/// - GET  /withdrawals - All withdrawal requests
/// - POST /withdrawals/:id/decision - Approve/reject/complete a withdrawal
/// - GET  /streaming - SSE feed of all record changes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/channels", get(list_channels))
        .route("/channels/:id/review", post(review_channel))
        .route("/shorts", get(list_shorts))
        .route("/shorts/:id/review", post(review_short))
        .route("/shorts/:id/metrics", post(update_short_metrics))
        .route("/withdrawals", get(list_withdrawals))
        .route("/withdrawals/:id/decision", post(decide_withdrawal))
        .route("/streaming", get(super::streaming::stream_admin))
}

fn parse_review_decision(decision: &str) -> Result<ReviewStatus, AppError> {
    match ReviewStatus::parse(decision) {
        Some(status) if status.is_terminal() => Ok(status),
        _ => Err(AppError::Validation(
            "decision must be approved or rejected".to_string(),
        )),
    }
}

// =============================================================================
// Users
// =============================================================================

/// GET /admin/users
async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let profiles = build_ledger_service(&state).list_profiles().await?;

    Ok(Json(profiles.iter().map(profile_to_response).collect()))
}

// =============================================================================
// Channel review
// =============================================================================

/// GET /admin/channels
async fn list_channels(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    let channels = build_submission_service(&state).list_all_channels().await?;

    Ok(Json(channels.iter().map(channel_to_response).collect()))
}

/// POST /admin/channels/:id/review
async fn review_channel(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ChannelResponse>, AppError> {
    let decision = parse_review_decision(&request.decision)?;
    let channel = build_submission_service(&state)
        .review_channel(&id, decision, request.remarks, &admin.session.user_id)
        .await?;

    Ok(Json(channel_to_response(&channel)))
}

// =============================================================================
// Short review and metrics
// =============================================================================

/// GET /admin/shorts
async fn list_shorts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ShortResponse>>, AppError> {
    let shorts = build_submission_service(&state).list_all_shorts().await?;

    Ok(Json(shorts.iter().map(short_to_response).collect()))
}

/// POST /admin/shorts/:id/review
async fn review_short(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ShortResponse>, AppError> {
    let decision = parse_review_decision(&request.decision)?;
    let short = build_submission_service(&state)
        .review_short(&id, decision, request.remarks, &admin.session.user_id)
        .await?;

    Ok(Json(short_to_response(&short)))
}

/// POST /admin/shorts/:id/metrics
///
/// Sets the counted views and per-view rate; the uncounted view delta
/// is credited to the owner's balance in the same transaction.
async fn update_short_metrics(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<ShortMetricsRequest>,
) -> Result<Json<ShortMetricsResponse>, AppError> {
    let (short, credited) = build_ledger_service(&state)
        .set_short_metrics(&id, request.views_count, request.earnings_per_view)
        .await?;

    Ok(Json(ShortMetricsResponse {
        short: short_to_response(&short),
        credited,
    }))
}

// =============================================================================
// Withdrawals
// =============================================================================

/// GET /admin/withdrawals
async fn list_withdrawals(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<WithdrawalResponse>>, AppError> {
    let withdrawals = build_withdrawal_service(&state).list_all().await?;

    Ok(Json(withdrawals.iter().map(withdrawal_to_response).collect()))
}

/// POST /admin/withdrawals/:id/decision
async fn decide_withdrawal(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<WithdrawalActionRequest>,
) -> Result<Json<WithdrawalResponse>, AppError> {
    let action = WithdrawalAction::parse(&request.action).ok_or_else(|| {
        AppError::Validation("action must be approve, reject or complete".to_string())
    })?;

    let withdrawal = build_withdrawal_service(&state)
        .decide(&id, action, request.remarks, &admin.session.user_id)
        .await?;

    Ok(Json(withdrawal_to_response(&withdrawal)))
}
