//! Ledger service
//!
//! Maintains the authoritative per-user earnings balance. The only
//! credit path is view accrual on approved shorts; debits happen in
//! the withdrawal workflow.

use std::sync::Arc;

use crate::data::{Collection, Database, EventHub, Profile, RecordChange, ShortSubmission};
use crate::error::AppError;

/// Ledger service
pub struct LedgerService {
    db: Arc<Database>,
    events: Arc<EventHub>,
}

impl LedgerService {
    /// Create new ledger service
    pub fn new(db: Arc<Database>, events: Arc<EventHub>) -> Self {
        Self { db, events }
    }

    /// Get a user's profile
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, AppError> {
        self.db
            .get_profile_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// List all profiles (admin view)
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.db.list_profiles().await
    }

    /// Set view count and per-view rate on an approved short, crediting
    /// the uncounted view delta to the owner's balance exactly once.
    ///
    /// # Returns
    /// The updated short and the credited amount.
    pub async fn set_short_metrics(
        &self,
        id: &str,
        views_count: i64,
        earnings_per_view: f64,
    ) -> Result<(ShortSubmission, f64), AppError> {
        if views_count < 0 {
            return Err(AppError::Validation(
                "views_count must be non-negative".to_string(),
            ));
        }
        if !earnings_per_view.is_finite() || earnings_per_view < 0.0 {
            return Err(AppError::Validation(
                "earnings_per_view must be a non-negative number".to_string(),
            ));
        }

        let (short, credit) = self
            .db
            .update_short_metrics(id, views_count, earnings_per_view)
            .await?;

        if credit > 0.0 {
            crate::metrics::LEDGER_CREDITS.inc_by(credit);
            self.events.publish(RecordChange {
                collection: Collection::Profiles,
                id: short.user_id.clone(),
                user_id: short.user_id.clone(),
                status: "credited".to_string(),
            });
        }
        self.events.publish(RecordChange {
            collection: Collection::Shorts,
            id: short.id.clone(),
            user_id: short.user_id.clone(),
            status: short.status.clone(),
        });

        tracing::info!(
            id = %short.id,
            views = views_count,
            rate = earnings_per_view,
            credited = credit,
            "Short metrics updated"
        );

        Ok((short, credit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReviewStatus;
    use crate::service::SubmissionService;
    use tempfile::TempDir;

    async fn create_services() -> (LedgerService, SubmissionService, Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(
            Database::connect(&temp_dir.path().join("test.db"))
                .await
                .unwrap(),
        );
        let events = Arc::new(EventHub::default());
        let ledger = LedgerService::new(db.clone(), events.clone());
        let submissions = SubmissionService::new(db.clone(), events, 0.0001);
        (ledger, submissions, db, temp_dir)
    }

    #[tokio::test]
    async fn metrics_edit_rejects_negative_inputs() {
        let (ledger, _, _, _temp_dir) = create_services().await;

        let err = ledger.set_short_metrics("any", -1, 0.0001).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = ledger.set_short_metrics("any", 10, -0.5).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = ledger.set_short_metrics("any", 10, f64::NAN).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn accrual_credits_owner_balance() {
        let (ledger, submissions, db, _temp_dir) = create_services().await;
        db.upsert_profile_on_login("user-1", "u1@example.com", None, false)
            .await
            .unwrap();

        let short = submissions
            .submit_short("user-1", "https://youtube.com/shorts/abc", None)
            .await
            .unwrap();
        submissions
            .review_short(&short.id, ReviewStatus::Approved, None, "admin-1")
            .await
            .unwrap();

        let (_, credit) = ledger.set_short_metrics(&short.id, 1000, 0.0001).await.unwrap();
        assert!((credit - 0.1).abs() < 1e-9);

        let profile = ledger.get_profile("user-1").await.unwrap();
        assert!((profile.earnings - 0.1).abs() < 1e-9);
    }
}
