//! Creator API endpoints
//!
//! User-facing endpoints: profile, channel/short submissions, wallet.
//! All routes require authentication; every record is read and written
//! through the authenticated owner id, never a client-supplied one.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};

use super::converters::*;
use super::dto::*;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::{BankDetails, LedgerService, SubmissionService, WithdrawalService};

/// Create creator API router
///
/// Routes:
/// - GET  /v1/me - Current profile
/// - POST /v1/channels - Submit a channel
/// - GET  /v1/channels - Own channel submissions
/// - POST /v1/shorts - Submit a short
/// - GET  /v1/shorts - Own short submissions
/// - POST /v1/withdrawals - Request a withdrawal
/// - GET  /v1/withdrawals - Own withdrawal requests
pub fn creator_router() -> Router<AppState> {
    Router::new()
        .route("/v1/me", get(get_me))
        .route("/v1/channels", post(submit_channel).get(list_channels))
        .route("/v1/shorts", post(submit_short).get(list_shorts))
        .route(
            "/v1/withdrawals",
            post(request_withdrawal).get(list_withdrawals),
        )
}

pub(super) fn build_submission_service(state: &AppState) -> SubmissionService {
    SubmissionService::new(
        state.db.clone(),
        state.events.clone(),
        state.config.payout.default_earnings_per_view,
    )
}

pub(super) fn build_ledger_service(state: &AppState) -> LedgerService {
    LedgerService::new(state.db.clone(), state.events.clone())
}

pub(super) fn build_withdrawal_service(state: &AppState) -> WithdrawalService {
    WithdrawalService::new(
        state.db.clone(),
        state.events.clone(),
        state.config.payout.clone(),
    )
}

// =============================================================================
// Profile
// =============================================================================

/// GET /api/v1/me
///
/// Returns the authenticated user's profile with balances.
async fn get_me(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/api/v1/me"])
        .start_timer();

    let profile = build_ledger_service(&state)
        .get_profile(&session.user_id)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/v1/me", "200"])
        .inc();

    Ok(Json(profile_to_response(&profile)))
}

// =============================================================================
// Channels
// =============================================================================

/// POST /api/v1/channels
async fn submit_channel(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(request): Json<SubmitChannelRequest>,
) -> Result<Json<ChannelResponse>, AppError> {
    let channel = build_submission_service(&state)
        .submit_channel(&session.user_id, &request.channel_url, request.channel_name)
        .await?;

    Ok(Json(channel_to_response(&channel)))
}

/// GET /api/v1/channels
async fn list_channels(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    let channels = build_submission_service(&state)
        .list_channels_for(&session.user_id)
        .await?;

    Ok(Json(channels.iter().map(channel_to_response).collect()))
}

// =============================================================================
// Shorts
// =============================================================================

/// POST /api/v1/shorts
async fn submit_short(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(request): Json<SubmitShortRequest>,
) -> Result<Json<ShortResponse>, AppError> {
    let short = build_submission_service(&state)
        .submit_short(&session.user_id, &request.shorts_url, request.title)
        .await?;

    Ok(Json(short_to_response(&short)))
}

/// GET /api/v1/shorts
async fn list_shorts(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<Vec<ShortResponse>>, AppError> {
    let shorts = build_submission_service(&state)
        .list_shorts_for(&session.user_id)
        .await?;

    Ok(Json(shorts.iter().map(short_to_response).collect()))
}

// =============================================================================
// Wallet
// =============================================================================

/// POST /api/v1/withdrawals
///
/// Reserves the amount from the available balance and creates a pending
/// request in one atomic step.
async fn request_withdrawal(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<WithdrawalResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/api/v1/withdrawals"])
        .start_timer();

    let bank = BankDetails {
        bank_name: request.bank_name,
        account_name: request.bank_account_name,
        account_number: request.bank_account_number,
        routing_number: request.routing_number,
        ifsc_code: request.ifsc_code,
    };
    let withdrawal = build_withdrawal_service(&state)
        .request(&session.user_id, request.amount, bank)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/api/v1/withdrawals", "200"])
        .inc();

    Ok(Json(withdrawal_to_response(&withdrawal)))
}

/// GET /api/v1/withdrawals
async fn list_withdrawals(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<Vec<WithdrawalResponse>>, AppError> {
    let withdrawals = build_withdrawal_service(&state)
        .list_for(&session.user_id)
        .await?;

    Ok(Json(withdrawals.iter().map(withdrawal_to_response).collect()))
}
