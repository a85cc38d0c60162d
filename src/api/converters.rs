//! Model to DTO converters

use super::dto::*;
use crate::data::{ChannelSubmission, Profile, ShortSubmission, WithdrawalRequest};

/// Convert a Profile to API response
pub fn profile_to_response(profile: &Profile) -> ProfileResponse {
    ProfileResponse {
        id: profile.id.clone(),
        user_id: profile.user_id.clone(),
        email: profile.email.clone(),
        full_name: profile.full_name.clone(),
        earnings: profile.earnings,
        total_earnings: profile.total_earnings,
        is_admin: profile.is_admin,
        created_at: profile.created_at,
    }
}

/// Convert a ChannelSubmission to API response
pub fn channel_to_response(channel: &ChannelSubmission) -> ChannelResponse {
    ChannelResponse {
        id: channel.id.clone(),
        user_id: channel.user_id.clone(),
        channel_url: channel.channel_url.clone(),
        channel_name: channel.channel_name.clone(),
        status: channel.status.clone(),
        admin_remarks: channel.admin_remarks.clone(),
        submitted_at: channel.submitted_at,
        reviewed_at: channel.reviewed_at,
    }
}

/// Convert a ShortSubmission to API response
pub fn short_to_response(short: &ShortSubmission) -> ShortResponse {
    ShortResponse {
        id: short.id.clone(),
        user_id: short.user_id.clone(),
        shorts_url: short.shorts_url.clone(),
        title: short.title.clone(),
        status: short.status.clone(),
        views_count: short.views_count,
        earnings_per_view: short.earnings_per_view,
        admin_remarks: short.admin_remarks.clone(),
        submitted_at: short.submitted_at,
        reviewed_at: short.reviewed_at,
    }
}

/// Convert a WithdrawalRequest to API response
pub fn withdrawal_to_response(withdrawal: &WithdrawalRequest) -> WithdrawalResponse {
    WithdrawalResponse {
        id: withdrawal.id.clone(),
        user_id: withdrawal.user_id.clone(),
        amount: withdrawal.amount,
        bank_name: withdrawal.bank_name.clone(),
        bank_account_name: withdrawal.bank_account_name.clone(),
        bank_account_number: withdrawal.bank_account_number.clone(),
        routing_number: withdrawal.routing_number.clone(),
        ifsc_code: withdrawal.ifsc_code.clone(),
        status: withdrawal.status.clone(),
        admin_remarks: withdrawal.admin_remarks.clone(),
        created_at: withdrawal.created_at,
        processed_at: withdrawal.processed_at,
    }
}
