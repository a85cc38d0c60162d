//! Submission service
//!
//! Handles channel and short submissions: creation by users and
//! review transitions by admins.

use std::sync::Arc;

use chrono::Utc;

use crate::data::{
    ChannelSubmission, Collection, Database, EntityId, EventHub, RecordChange, ReviewStatus,
    ShortSubmission,
};
use crate::error::AppError;

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Validate a submitted link: http/https scheme with a non-empty host.
fn validate_submission_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let parsed = url::Url::parse(trimmed)
        .map_err(|_| AppError::Validation(format!("not a valid URL: {trimmed}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Validation(
            "url must use http or https".to_string(),
        ));
    }
    if parsed.host_str().is_none() {
        return Err(AppError::Validation("url must have a host".to_string()));
    }

    Ok(parsed.to_string())
}

/// Submission service
pub struct SubmissionService {
    db: Arc<Database>,
    events: Arc<EventHub>,
    default_earnings_per_view: f64,
}

impl SubmissionService {
    /// Create new submission service
    pub fn new(db: Arc<Database>, events: Arc<EventHub>, default_earnings_per_view: f64) -> Self {
        Self {
            db,
            events,
            default_earnings_per_view,
        }
    }

    // =========================================================================
    // Channels
    // =========================================================================

    /// Submit a channel for review
    ///
    /// # Arguments
    /// * `owner` - Authenticated user id (trusted, from the session)
    /// * `channel_url` - Channel link, validated for well-formedness
    /// * `channel_name` - Optional display name
    pub async fn submit_channel(
        &self,
        owner: &str,
        channel_url: &str,
        channel_name: Option<String>,
    ) -> Result<ChannelSubmission, AppError> {
        let channel = ChannelSubmission {
            id: EntityId::new().0,
            user_id: owner.to_string(),
            channel_url: validate_submission_url(channel_url)?,
            channel_name: normalize_optional_text(channel_name),
            status: ReviewStatus::Pending.as_str().to_string(),
            admin_remarks: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };

        self.db.insert_channel(&channel).await?;
        crate::metrics::SUBMISSIONS_TOTAL
            .with_label_values(&["channel"])
            .inc();
        self.events.publish(RecordChange {
            collection: Collection::Channels,
            id: channel.id.clone(),
            user_id: channel.user_id.clone(),
            status: channel.status.clone(),
        });

        tracing::info!(id = %channel.id, owner = %owner, "Channel submitted");

        Ok(channel)
    }

    /// List channel submissions owned by a user, newest first
    pub async fn list_channels_for(&self, owner: &str) -> Result<Vec<ChannelSubmission>, AppError> {
        self.db.list_channels_by_user(owner).await
    }

    /// List all channel submissions (admin view)
    pub async fn list_all_channels(&self) -> Result<Vec<ChannelSubmission>, AppError> {
        self.db.list_channels().await
    }

    /// Review a pending channel submission (admin only; enforced by the caller's
    /// route guard). Terminal states are final: re-review is a conflict.
    pub async fn review_channel(
        &self,
        id: &str,
        decision: ReviewStatus,
        remarks: Option<String>,
        reviewer: &str,
    ) -> Result<ChannelSubmission, AppError> {
        if !decision.is_terminal() {
            return Err(AppError::Validation(
                "decision must be approved or rejected".to_string(),
            ));
        }

        let remarks = normalize_optional_text(remarks);
        let channel = self
            .db
            .review_channel(id, decision, remarks.as_deref(), reviewer)
            .await?;

        crate::metrics::REVIEWS_TOTAL
            .with_label_values(&["channel", decision.as_str()])
            .inc();
        self.events.publish(RecordChange {
            collection: Collection::Channels,
            id: channel.id.clone(),
            user_id: channel.user_id.clone(),
            status: channel.status.clone(),
        });

        tracing::info!(
            id = %channel.id,
            decision = decision.as_str(),
            reviewer = %reviewer,
            "Channel reviewed"
        );

        Ok(channel)
    }

    // =========================================================================
    // Shorts
    // =========================================================================

    /// Submit a short for review
    pub async fn submit_short(
        &self,
        owner: &str,
        shorts_url: &str,
        title: Option<String>,
    ) -> Result<ShortSubmission, AppError> {
        let short = ShortSubmission {
            id: EntityId::new().0,
            user_id: owner.to_string(),
            shorts_url: validate_submission_url(shorts_url)?,
            title: normalize_optional_text(title),
            status: ReviewStatus::Pending.as_str().to_string(),
            views_count: 0,
            credited_views: 0,
            earnings_per_view: self.default_earnings_per_view,
            admin_remarks: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };

        self.db.insert_short(&short).await?;
        crate::metrics::SUBMISSIONS_TOTAL
            .with_label_values(&["short"])
            .inc();
        self.events.publish(RecordChange {
            collection: Collection::Shorts,
            id: short.id.clone(),
            user_id: short.user_id.clone(),
            status: short.status.clone(),
        });

        tracing::info!(id = %short.id, owner = %owner, "Short submitted");

        Ok(short)
    }

    /// List short submissions owned by a user, newest first
    pub async fn list_shorts_for(&self, owner: &str) -> Result<Vec<ShortSubmission>, AppError> {
        self.db.list_shorts_by_user(owner).await
    }

    /// List all short submissions (admin view)
    pub async fn list_all_shorts(&self) -> Result<Vec<ShortSubmission>, AppError> {
        self.db.list_shorts().await
    }

    /// Review a pending short submission (same semantics as channels).
    pub async fn review_short(
        &self,
        id: &str,
        decision: ReviewStatus,
        remarks: Option<String>,
        reviewer: &str,
    ) -> Result<ShortSubmission, AppError> {
        if !decision.is_terminal() {
            return Err(AppError::Validation(
                "decision must be approved or rejected".to_string(),
            ));
        }

        let remarks = normalize_optional_text(remarks);
        let short = self
            .db
            .review_short(id, decision, remarks.as_deref(), reviewer)
            .await?;

        crate::metrics::REVIEWS_TOTAL
            .with_label_values(&["short", decision.as_str()])
            .inc();
        self.events.publish(RecordChange {
            collection: Collection::Shorts,
            id: short.id.clone(),
            user_id: short.user_id.clone(),
            status: short.status.clone(),
        });

        tracing::info!(
            id = %short.id,
            decision = decision.as_str(),
            reviewer = %reviewer,
            "Short reviewed"
        );

        Ok(short)
    }
}
