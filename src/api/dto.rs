//! API response DTOs
//!
//! Data Transfer Objects for JSON API responses. Internal bookkeeping
//! columns (accrual watermark) are not exposed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
    /// Available balance
    pub earnings: f64,
    /// Lifetime withdrawn total
    pub total_earnings: f64,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Channel submission response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub id: String,
    pub user_id: String,
    pub channel_url: String,
    pub channel_name: Option<String>,
    pub status: String,
    pub admin_remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Short submission response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortResponse {
    pub id: String,
    pub user_id: String,
    pub shorts_url: String,
    pub title: Option<String>,
    pub status: String,
    pub views_count: i64,
    pub earnings_per_view: f64,
    pub admin_remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Withdrawal request response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalResponse {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub bank_name: String,
    pub bank_account_name: String,
    pub bank_account_number: String,
    pub routing_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub status: String,
    pub admin_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Short metrics edit result: the updated short plus the amount the
/// edit credited to the owner's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortMetricsResponse {
    #[serde(flatten)]
    pub short: ShortResponse,
    pub credited: f64,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Submit a channel for review
#[derive(Debug, Deserialize)]
pub struct SubmitChannelRequest {
    pub channel_url: String,
    pub channel_name: Option<String>,
}

/// Submit a short for review
#[derive(Debug, Deserialize)]
pub struct SubmitShortRequest {
    pub shorts_url: String,
    pub title: Option<String>,
}

/// Request a withdrawal
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub amount: f64,
    pub bank_name: String,
    pub bank_account_name: String,
    pub bank_account_number: String,
    pub routing_number: Option<String>,
    pub ifsc_code: Option<String>,
}

/// Admin review decision on a submission
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// "approved" or "rejected"
    pub decision: String,
    pub remarks: Option<String>,
}

/// Admin view/rate edit on an approved short
#[derive(Debug, Deserialize)]
pub struct ShortMetricsRequest {
    pub views_count: i64,
    pub earnings_per_view: f64,
}

/// Admin action on a withdrawal request
#[derive(Debug, Deserialize)]
pub struct WithdrawalActionRequest {
    /// "approve", "reject" or "complete"
    pub action: String,
    pub remarks: Option<String>,
}
