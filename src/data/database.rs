//! SQLite database operations
//!
//! All database access goes through this module. Every business
//! operation that touches more than one row runs inside an IMMEDIATE
//! transaction so concurrent writers serialize on the database and
//! no partial update can persist.

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

/// Admin decision on a pending withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalDecision {
    /// Reservation becomes a permanent debit; total_earnings increases.
    Approve,
    /// Reservation is released back to the available balance.
    Reject,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Get a profile by identity-provider user id
    pub async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// List all profiles, newest first
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let profiles =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(profiles)
    }

    /// Count registered profiles
    pub async fn count_profiles(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Create or refresh a profile at sign-in.
    ///
    /// Inserts a zero-balance profile on first sign-in. On later sign-ins
    /// the email, display name and admin flag are refreshed; the ledger
    /// columns are never touched here. The admin flag comes from server
    /// configuration only.
    ///
    /// Uses an IMMEDIATE transaction so concurrent first sign-ins of the
    /// same user cannot create two profiles.
    pub async fn upsert_profile_on_login(
        &self,
        user_id: &str,
        email: &str,
        full_name: Option<&str>,
        is_admin: bool,
    ) -> Result<Profile, AppError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result: Result<Profile, AppError> = async {
            let now = Utc::now();
            let existing =
                sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
                    .bind(user_id)
                    .fetch_optional(&mut *conn)
                    .await?;

            if existing.is_some() {
                sqlx::query(
                    r#"
                    UPDATE profiles
                    SET email = ?, full_name = ?, is_admin = ?, updated_at = ?
                    WHERE user_id = ?
                    "#,
                )
                .bind(email)
                .bind(full_name)
                .bind(is_admin)
                .bind(now)
                .bind(user_id)
                .execute(&mut *conn)
                .await?;
            } else {
                sqlx::query(
                    r#"
                    INSERT INTO profiles (
                        id, user_id, email, full_name, earnings, total_earnings,
                        is_admin, created_at, updated_at
                    ) VALUES (?, ?, ?, ?, 0, 0, ?, ?, ?)
                    "#,
                )
                .bind(EntityId::new().0)
                .bind(user_id)
                .bind(email)
                .bind(full_name)
                .bind(is_admin)
                .bind(now)
                .bind(now)
                .execute(&mut *conn)
                .await?;
            }

            let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&mut *conn)
                .await?;

            Ok(profile)
        }
        .await;

        match result {
            Ok(profile) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(profile)
            }
            Err(error) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(error)
            }
        }
    }

    // =========================================================================
    // Channel submissions
    // =========================================================================

    /// Insert a new channel submission
    pub async fn insert_channel(&self, channel: &ChannelSubmission) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO channels (
                id, user_id, channel_url, channel_name, status, admin_remarks,
                submitted_at, reviewed_at, reviewed_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&channel.id)
        .bind(&channel.user_id)
        .bind(&channel.channel_url)
        .bind(&channel.channel_name)
        .bind(&channel.status)
        .bind(&channel.admin_remarks)
        .bind(channel.submitted_at)
        .bind(channel.reviewed_at)
        .bind(&channel.reviewed_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a channel submission by id
    pub async fn get_channel(&self, id: &str) -> Result<Option<ChannelSubmission>, AppError> {
        let channel =
            sqlx::query_as::<_, ChannelSubmission>("SELECT * FROM channels WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(channel)
    }

    /// List channel submissions owned by a user, newest first
    pub async fn list_channels_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChannelSubmission>, AppError> {
        let channels = sqlx::query_as::<_, ChannelSubmission>(
            "SELECT * FROM channels WHERE user_id = ? ORDER BY submitted_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    /// List all channel submissions, newest first
    pub async fn list_channels(&self) -> Result<Vec<ChannelSubmission>, AppError> {
        let channels = sqlx::query_as::<_, ChannelSubmission>(
            "SELECT * FROM channels ORDER BY submitted_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    /// Review a pending channel submission.
    ///
    /// Compare-and-swap on `status = 'pending'`: a submission already in a
    /// terminal state is reported as a conflict, so duplicate or concurrent
    /// review actions cannot re-write a decision.
    pub async fn review_channel(
        &self,
        id: &str,
        decision: ReviewStatus,
        remarks: Option<&str>,
        reviewer: &str,
    ) -> Result<ChannelSubmission, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE channels
            SET status = ?, admin_remarks = ?, reviewed_at = ?, reviewed_by = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(decision.as_str())
        .bind(remarks)
        .bind(Utc::now())
        .bind(reviewer)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return match self.get_channel(id).await? {
                Some(_) => Err(AppError::Conflict(
                    "channel submission was already reviewed".to_string(),
                )),
                None => Err(AppError::NotFound),
            };
        }

        self.get_channel(id).await?.ok_or(AppError::NotFound)
    }

    // =========================================================================
    // Short submissions
    // =========================================================================

    /// Insert a new short submission
    pub async fn insert_short(&self, short: &ShortSubmission) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO shorts (
                id, user_id, shorts_url, title, status, views_count, credited_views,
                earnings_per_view, admin_remarks, submitted_at, reviewed_at, reviewed_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&short.id)
        .bind(&short.user_id)
        .bind(&short.shorts_url)
        .bind(&short.title)
        .bind(&short.status)
        .bind(short.views_count)
        .bind(short.credited_views)
        .bind(short.earnings_per_view)
        .bind(&short.admin_remarks)
        .bind(short.submitted_at)
        .bind(short.reviewed_at)
        .bind(&short.reviewed_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a short submission by id
    pub async fn get_short(&self, id: &str) -> Result<Option<ShortSubmission>, AppError> {
        let short = sqlx::query_as::<_, ShortSubmission>("SELECT * FROM shorts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(short)
    }

    /// List short submissions owned by a user, newest first
    pub async fn list_shorts_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ShortSubmission>, AppError> {
        let shorts = sqlx::query_as::<_, ShortSubmission>(
            "SELECT * FROM shorts WHERE user_id = ? ORDER BY submitted_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shorts)
    }

    /// List all short submissions, newest first
    pub async fn list_shorts(&self) -> Result<Vec<ShortSubmission>, AppError> {
        let shorts =
            sqlx::query_as::<_, ShortSubmission>("SELECT * FROM shorts ORDER BY submitted_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(shorts)
    }

    /// Review a pending short submission (same CAS semantics as channels).
    pub async fn review_short(
        &self,
        id: &str,
        decision: ReviewStatus,
        remarks: Option<&str>,
        reviewer: &str,
    ) -> Result<ShortSubmission, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE shorts
            SET status = ?, admin_remarks = ?, reviewed_at = ?, reviewed_by = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(decision.as_str())
        .bind(remarks)
        .bind(Utc::now())
        .bind(reviewer)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return match self.get_short(id).await? {
                Some(_) => Err(AppError::Conflict(
                    "short submission was already reviewed".to_string(),
                )),
                None => Err(AppError::NotFound),
            };
        }

        self.get_short(id).await?.ok_or(AppError::NotFound)
    }

    /// Set view count and per-view rate on an approved short and credit the
    /// uncounted view delta to the owner's balance.
    ///
    /// Accrual is idempotent: `credited_views` is a high-water mark, so
    /// re-sending the same counts credits nothing, and lowering a count
    /// never claws back credit. The whole operation is one IMMEDIATE
    /// transaction.
    ///
    /// # Returns
    /// The updated short and the amount credited (0.0 when no new views).
    pub async fn update_short_metrics(
        &self,
        id: &str,
        views_count: i64,
        earnings_per_view: f64,
    ) -> Result<(ShortSubmission, f64), AppError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result: Result<(ShortSubmission, f64), AppError> = async {
            let short = sqlx::query_as::<_, ShortSubmission>("SELECT * FROM shorts WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or(AppError::NotFound)?;

            if short.review_status() != Some(ReviewStatus::Approved) {
                return Err(AppError::Conflict(
                    "views can only be set on an approved short".to_string(),
                ));
            }

            let uncounted = (views_count - short.credited_views).max(0);
            let credit = uncounted as f64 * earnings_per_view;
            let new_watermark = short.credited_views.max(views_count);

            sqlx::query(
                r#"
                UPDATE shorts
                SET views_count = ?, earnings_per_view = ?, credited_views = ?
                WHERE id = ?
                "#,
            )
            .bind(views_count)
            .bind(earnings_per_view)
            .bind(new_watermark)
            .bind(id)
            .execute(&mut *conn)
            .await?;

            if credit > 0.0 {
                let credited = sqlx::query(
                    "UPDATE profiles SET earnings = earnings + ?, updated_at = ? WHERE user_id = ?",
                )
                .bind(credit)
                .bind(Utc::now())
                .bind(&short.user_id)
                .execute(&mut *conn)
                .await?;
                if credited.rows_affected() == 0 {
                    return Err(AppError::Internal(anyhow::anyhow!(
                        "short {} has no owning profile",
                        id
                    )));
                }
            }

            let updated = sqlx::query_as::<_, ShortSubmission>("SELECT * FROM shorts WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;

            Ok((updated, credit))
        }
        .await;

        match result {
            Ok(value) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(value)
            }
            Err(error) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(error)
            }
        }
    }

    // =========================================================================
    // Withdrawals
    // =========================================================================

    /// Get a withdrawal request by id
    pub async fn get_withdrawal(&self, id: &str) -> Result<Option<WithdrawalRequest>, AppError> {
        let withdrawal =
            sqlx::query_as::<_, WithdrawalRequest>("SELECT * FROM withdrawals WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(withdrawal)
    }

    /// List withdrawal requests owned by a user, newest first
    pub async fn list_withdrawals_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<WithdrawalRequest>, AppError> {
        let withdrawals = sqlx::query_as::<_, WithdrawalRequest>(
            "SELECT * FROM withdrawals WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(withdrawals)
    }

    /// List all withdrawal requests, newest first
    pub async fn list_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, AppError> {
        let withdrawals = sqlx::query_as::<_, WithdrawalRequest>(
            "SELECT * FROM withdrawals ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(withdrawals)
    }

    /// Sum of withdrawal amounts that became permanent debits for a user
    /// (approved, including those later marked completed).
    pub async fn sum_settled_withdrawals(&self, user_id: &str) -> Result<f64, AppError> {
        let sum: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0.0)
            FROM withdrawals
            WHERE user_id = ? AND status IN ('approved', 'completed')
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum)
    }

    /// Reserve funds and create a withdrawal request atomically.
    ///
    /// The debit statement carries the sufficiency predicate
    /// (`earnings >= amount`), so two concurrent requests over the same
    /// balance serialize on the IMMEDIATE transaction and the second one
    /// observes the already-reduced balance and fails. The balance can
    /// never go negative.
    ///
    /// # Errors
    /// `InsufficientBalance` when the balance does not cover the amount,
    /// `NotFound` when the owner has no profile.
    pub async fn create_withdrawal(
        &self,
        withdrawal: &WithdrawalRequest,
    ) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result: Result<(), AppError> = async {
            let debited = sqlx::query(
                r#"
                UPDATE profiles
                SET earnings = earnings - ?, updated_at = ?
                WHERE user_id = ? AND earnings >= ?
                "#,
            )
            .bind(withdrawal.amount)
            .bind(Utc::now())
            .bind(&withdrawal.user_id)
            .bind(withdrawal.amount)
            .execute(&mut *conn)
            .await?;

            if debited.rows_affected() == 0 {
                let exists: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE user_id = ?")
                        .bind(&withdrawal.user_id)
                        .fetch_one(&mut *conn)
                        .await?;
                if exists == 0 {
                    return Err(AppError::NotFound);
                }
                return Err(AppError::InsufficientBalance(
                    "earnings balance does not cover the requested amount".to_string(),
                ));
            }

            sqlx::query(
                r#"
                INSERT INTO withdrawals (
                    id, user_id, amount, bank_name, bank_account_name, bank_account_number,
                    routing_number, ifsc_code, status, admin_remarks, created_at,
                    processed_at, processed_by
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&withdrawal.id)
            .bind(&withdrawal.user_id)
            .bind(withdrawal.amount)
            .bind(&withdrawal.bank_name)
            .bind(&withdrawal.bank_account_name)
            .bind(&withdrawal.bank_account_number)
            .bind(&withdrawal.routing_number)
            .bind(&withdrawal.ifsc_code)
            .bind(&withdrawal.status)
            .bind(&withdrawal.admin_remarks)
            .bind(withdrawal.created_at)
            .bind(withdrawal.processed_at)
            .bind(&withdrawal.processed_by)
            .execute(&mut *conn)
            .await?;

            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(())
            }
            Err(error) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(error)
            }
        }
    }

    /// Decide a pending withdrawal request.
    ///
    /// Compare-and-swap on `status = 'pending'` inside an IMMEDIATE
    /// transaction: approval makes the reservation permanent and adds the
    /// amount to `total_earnings`; rejection refunds the reservation to
    /// the available balance. Concurrent decisions on the same request
    /// leave exactly one winner; the loser gets a conflict.
    pub async fn decide_withdrawal(
        &self,
        id: &str,
        decision: WithdrawalDecision,
        remarks: Option<&str>,
        processor: &str,
    ) -> Result<WithdrawalRequest, AppError> {
        let new_status = match decision {
            WithdrawalDecision::Approve => WithdrawalStatus::Approved,
            WithdrawalDecision::Reject => WithdrawalStatus::Rejected,
        };

        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result: Result<WithdrawalRequest, AppError> = async {
            let withdrawal =
                sqlx::query_as::<_, WithdrawalRequest>("SELECT * FROM withdrawals WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await?
                    .ok_or(AppError::NotFound)?;

            let updated = sqlx::query(
                r#"
                UPDATE withdrawals
                SET status = ?, admin_remarks = ?, processed_at = ?, processed_by = ?
                WHERE id = ? AND status = 'pending'
                "#,
            )
            .bind(new_status.as_str())
            .bind(remarks)
            .bind(Utc::now())
            .bind(processor)
            .bind(id)
            .execute(&mut *conn)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::Conflict(
                    "withdrawal request was already processed".to_string(),
                ));
            }

            match decision {
                WithdrawalDecision::Approve => {
                    sqlx::query(
                        r#"
                        UPDATE profiles
                        SET total_earnings = total_earnings + ?, updated_at = ?
                        WHERE user_id = ?
                        "#,
                    )
                    .bind(withdrawal.amount)
                    .bind(Utc::now())
                    .bind(&withdrawal.user_id)
                    .execute(&mut *conn)
                    .await?;
                }
                WithdrawalDecision::Reject => {
                    sqlx::query(
                        r#"
                        UPDATE profiles
                        SET earnings = earnings + ?, updated_at = ?
                        WHERE user_id = ?
                        "#,
                    )
                    .bind(withdrawal.amount)
                    .bind(Utc::now())
                    .bind(&withdrawal.user_id)
                    .execute(&mut *conn)
                    .await?;
                }
            }

            let updated =
                sqlx::query_as::<_, WithdrawalRequest>("SELECT * FROM withdrawals WHERE id = ?")
                    .bind(id)
                    .fetch_one(&mut *conn)
                    .await?;

            Ok(updated)
        }
        .await;

        match result {
            Ok(withdrawal) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(withdrawal)
            }
            Err(error) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(error)
            }
        }
    }

    /// Mark an approved withdrawal as completed (bank transfer executed).
    ///
    /// No ledger effect; compare-and-swap on `status = 'approved'`.
    pub async fn complete_withdrawal(
        &self,
        id: &str,
        remarks: Option<&str>,
        processor: &str,
    ) -> Result<WithdrawalRequest, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE withdrawals
            SET status = 'completed',
                admin_remarks = COALESCE(?, admin_remarks),
                processed_at = ?, processed_by = ?
            WHERE id = ? AND status = 'approved'
            "#,
        )
        .bind(remarks)
        .bind(Utc::now())
        .bind(processor)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return match self.get_withdrawal(id).await? {
                Some(_) => Err(AppError::Conflict(
                    "only an approved withdrawal can be completed".to_string(),
                )),
                None => Err(AppError::NotFound),
            };
        }

        self.get_withdrawal(id).await?.ok_or(AppError::NotFound)
    }
}
