//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Status enums
// =============================================================================

/// Review status for channel and short submissions
///
/// `Pending` is the only initial state. `Approved` and `Rejected` are
/// terminal; a submission never transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Withdrawal request status
///
/// `Pending` holds a balance reservation. `Approved` makes the debit
/// permanent, `Rejected` refunds it. `Completed` marks an approved
/// request whose bank transfer has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// A creator's profile and earnings ledger entry
///
/// `user_id` is the opaque identifier from the identity provider,
/// 1:1 with an account. `earnings` is the available balance;
/// `total_earnings` is the lifetime withdrawn total.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    /// Stable identifier from the identity provider
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
    /// Available balance, never negative
    pub earnings: f64,
    /// Lifetime withdrawn total (sum of approved withdrawal amounts)
    pub total_earnings: f64,
    /// Out-of-band trust flag, never client-assignable
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Channel submission
// =============================================================================

/// A channel link submitted for admin review
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChannelSubmission {
    pub id: String,
    /// Owner (identity-provider user id)
    pub user_id: String,
    pub channel_url: String,
    pub channel_name: Option<String>,
    /// pending, approved, rejected
    pub status: String,
    pub admin_remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer (identity-provider user id)
    pub reviewed_by: Option<String>,
}

impl ChannelSubmission {
    pub fn review_status(&self) -> Option<ReviewStatus> {
        ReviewStatus::parse(&self.status)
    }
}

// =============================================================================
// Short submission
// =============================================================================

/// A short-form video submitted for admin review
///
/// `views_count` and `earnings_per_view` are admin-set and only
/// meaningful once status = approved. `credited_views` is the
/// high-water mark of views already converted into ledger credit.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShortSubmission {
    pub id: String,
    pub user_id: String,
    pub shorts_url: String,
    pub title: Option<String>,
    pub status: String,
    pub views_count: i64,
    /// Views already credited to the owner's balance
    pub credited_views: i64,
    pub earnings_per_view: f64,
    pub admin_remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
}

impl ShortSubmission {
    pub fn review_status(&self) -> Option<ReviewStatus> {
        ReviewStatus::parse(&self.status)
    }
}

// =============================================================================
// Withdrawal request
// =============================================================================

/// A withdrawal request against the earnings balance
///
/// Created with the amount already reserved (debited) from the owner's
/// balance; the admin decision commits or releases the reservation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WithdrawalRequest {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub bank_name: String,
    pub bank_account_name: String,
    pub bank_account_number: String,
    pub routing_number: Option<String>,
    pub ifsc_code: Option<String>,
    /// pending, approved, rejected, completed
    pub status: String,
    pub admin_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    /// Processor (identity-provider user id)
    pub processed_by: Option<String>,
}

impl WithdrawalRequest {
    pub fn withdrawal_status(&self) -> Option<WithdrawalStatus> {
        WithdrawalStatus::parse(&self.status)
    }
}
