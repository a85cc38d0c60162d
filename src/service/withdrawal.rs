//! Withdrawal service
//!
//! Handles withdrawal requests against the earnings balance and the
//! admin decision workflow: reserve on request, commit on approval,
//! release on rejection.

use std::sync::Arc;

use chrono::Utc;

use crate::config::{BankRegion, PayoutConfig};
use crate::data::{
    Collection, Database, EntityId, EventHub, RecordChange, WithdrawalDecision, WithdrawalRequest,
    WithdrawalStatus,
};
use crate::error::AppError;

/// Bank details supplied with a withdrawal request
#[derive(Debug, Clone)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub routing_number: Option<String>,
    pub ifsc_code: Option<String>,
}

/// Admin action on a withdrawal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalAction {
    Approve,
    Reject,
    /// Mark an approved request as paid out
    Complete,
}

impl WithdrawalAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

fn required_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

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

/// Withdrawal service
pub struct WithdrawalService {
    db: Arc<Database>,
    events: Arc<EventHub>,
    payout: PayoutConfig,
}

impl WithdrawalService {
    /// Create new withdrawal service
    pub fn new(db: Arc<Database>, events: Arc<EventHub>, payout: PayoutConfig) -> Self {
        Self { db, events, payout }
    }

    /// List withdrawal requests owned by a user, newest first
    pub async fn list_for(&self, owner: &str) -> Result<Vec<WithdrawalRequest>, AppError> {
        self.db.list_withdrawals_by_user(owner).await
    }

    /// List all withdrawal requests (admin view)
    pub async fn list_all(&self) -> Result<Vec<WithdrawalRequest>, AppError> {
        self.db.list_withdrawals().await
    }

    /// Request a withdrawal against the available balance.
    ///
    /// Validates the amount against the configured minimum and the bank
    /// details against the configured region, then reserves the funds and
    /// creates the pending request in one atomic step. The sufficiency
    /// check lives inside that transaction, so concurrent requests can
    /// never over-reserve the same balance.
    pub async fn request(
        &self,
        owner: &str,
        amount: f64,
        bank: BankDetails,
    ) -> Result<WithdrawalRequest, AppError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::Validation(
                "amount must be a positive number".to_string(),
            ));
        }
        if amount < self.payout.minimum_withdrawal {
            return Err(AppError::Validation(format!(
                "minimum withdrawal amount is {}",
                self.payout.minimum_withdrawal
            )));
        }

        let bank_name = required_text(&bank.bank_name, "bank_name")?;
        let bank_account_name = required_text(&bank.account_name, "bank_account_name")?;
        let bank_account_number = required_text(&bank.account_number, "bank_account_number")?;

        // Exactly one routing identifier is mandatory, selected by region.
        let (routing_number, ifsc_code) = match self.payout.region {
            BankRegion::Routing => {
                let routing = required_text(
                    bank.routing_number.as_deref().unwrap_or(""),
                    "routing_number",
                )?;
                (Some(routing), None)
            }
            BankRegion::Ifsc => {
                let ifsc = required_text(bank.ifsc_code.as_deref().unwrap_or(""), "ifsc_code")?;
                (None, Some(ifsc))
            }
        };

        let withdrawal = WithdrawalRequest {
            id: EntityId::new().0,
            user_id: owner.to_string(),
            amount,
            bank_name,
            bank_account_name,
            bank_account_number,
            routing_number,
            ifsc_code,
            status: WithdrawalStatus::Pending.as_str().to_string(),
            admin_remarks: None,
            created_at: Utc::now(),
            processed_at: None,
            processed_by: None,
        };

        self.db.create_withdrawal(&withdrawal).await?;

        crate::metrics::LEDGER_DEBITS.inc_by(amount);
        crate::metrics::WITHDRAWALS_TOTAL
            .with_label_values(&["requested"])
            .inc();
        self.publish_change(&withdrawal);
        self.publish_profile_change(owner, "reserved");

        tracing::info!(
            id = %withdrawal.id,
            owner = %owner,
            amount,
            "Withdrawal requested"
        );

        Ok(withdrawal)
    }

    /// Apply an admin action to a withdrawal request.
    ///
    /// Approve and reject act on pending requests (commit / release the
    /// reservation); complete acts on approved requests. Each transition
    /// is compare-and-swap, so a duplicate or concurrent action yields a
    /// conflict instead of a double-processed ledger.
    pub async fn decide(
        &self,
        id: &str,
        action: WithdrawalAction,
        remarks: Option<String>,
        processor: &str,
    ) -> Result<WithdrawalRequest, AppError> {
        let remarks = normalize_optional_text(remarks);

        let withdrawal = match action {
            WithdrawalAction::Approve => {
                self.db
                    .decide_withdrawal(id, WithdrawalDecision::Approve, remarks.as_deref(), processor)
                    .await?
            }
            WithdrawalAction::Reject => {
                self.db
                    .decide_withdrawal(id, WithdrawalDecision::Reject, remarks.as_deref(), processor)
                    .await?
            }
            WithdrawalAction::Complete => {
                self.db
                    .complete_withdrawal(id, remarks.as_deref(), processor)
                    .await?
            }
        };

        crate::metrics::WITHDRAWALS_TOTAL
            .with_label_values(&[withdrawal.status.as_str()])
            .inc();
        self.publish_change(&withdrawal);
        // Approval and rejection both move the owner's ledger.
        if action != WithdrawalAction::Complete {
            self.publish_profile_change(&withdrawal.user_id, &withdrawal.status);
        }

        tracing::info!(
            id = %withdrawal.id,
            status = %withdrawal.status,
            processor = %processor,
            "Withdrawal processed"
        );

        Ok(withdrawal)
    }

    fn publish_change(&self, withdrawal: &WithdrawalRequest) {
        self.events.publish(RecordChange {
            collection: Collection::Withdrawals,
            id: withdrawal.id.clone(),
            user_id: withdrawal.user_id.clone(),
            status: withdrawal.status.clone(),
        });
    }

    fn publish_profile_change(&self, user_id: &str, status: &str) {
        self.events.publish(RecordChange {
            collection: Collection::Profiles,
            id: user_id.to_string(),
            user_id: user_id.to_string(),
            status: status.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReviewStatus;
    use crate::service::{LedgerService, SubmissionService};
    use tempfile::TempDir;

    struct Fixture {
        withdrawals: WithdrawalService,
        ledger: LedgerService,
        _temp_dir: TempDir,
    }

    async fn create_fixture(region: BankRegion) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(
            Database::connect(&temp_dir.path().join("test.db"))
                .await
                .unwrap(),
        );
        let events = Arc::new(EventHub::default());
        let payout = PayoutConfig {
            minimum_withdrawal: 500.0,
            default_earnings_per_view: 0.0001,
            region,
        };

        // Seed a creator with a 1000.0 balance through the accrual path
        db.upsert_profile_on_login("user-1", "u1@example.com", None, false)
            .await
            .unwrap();
        let submissions = SubmissionService::new(db.clone(), events.clone(), 0.0001);
        let ledger = LedgerService::new(db.clone(), events.clone());
        let short = submissions
            .submit_short("user-1", "https://youtube.com/shorts/seed", None)
            .await
            .unwrap();
        submissions
            .review_short(&short.id, ReviewStatus::Approved, None, "admin-1")
            .await
            .unwrap();
        ledger.set_short_metrics(&short.id, 1000, 1.0).await.unwrap();

        Fixture {
            withdrawals: WithdrawalService::new(db, events, payout),
            ledger,
            _temp_dir: temp_dir,
        }
    }

    fn ifsc_bank() -> BankDetails {
        BankDetails {
            bank_name: "Test Bank".to_string(),
            account_name: "Test User".to_string(),
            account_number: "1234567890".to_string(),
            routing_number: None,
            ifsc_code: Some("TEST0001234".to_string()),
        }
    }

    #[tokio::test]
    async fn rejects_amount_below_minimum() {
        let fixture = create_fixture(BankRegion::Ifsc).await;

        let err = fixture
            .withdrawals
            .request("user-1", 499.0, ifsc_bank())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Nothing was reserved
        let profile = fixture.ledger.get_profile("user-1").await.unwrap();
        assert!((profile.earnings - 1000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn accepts_exactly_the_minimum() {
        let fixture = create_fixture(BankRegion::Ifsc).await;

        let withdrawal = fixture
            .withdrawals
            .request("user-1", 500.0, ifsc_bank())
            .await
            .unwrap();
        assert_eq!(withdrawal.status, "pending");

        let profile = fixture.ledger.get_profile("user-1").await.unwrap();
        assert!((profile.earnings - 500.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn rejects_amount_over_balance_distinctly() {
        let fixture = create_fixture(BankRegion::Ifsc).await;

        let err = fixture
            .withdrawals
            .request("user-1", 1500.0, ifsc_bank())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance(_)));
    }

    #[tokio::test]
    async fn region_selects_required_routing_identifier() {
        let fixture = create_fixture(BankRegion::Ifsc).await;
        let mut bank = ifsc_bank();
        bank.ifsc_code = None;
        bank.routing_number = Some("021000021".to_string());

        // IFSC region: a routing number does not satisfy the requirement
        let err = fixture
            .withdrawals
            .request("user-1", 500.0, bank)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let fixture = create_fixture(BankRegion::Routing).await;
        let mut bank = ifsc_bank();
        bank.ifsc_code = None;
        bank.routing_number = Some("021000021".to_string());

        let withdrawal = fixture
            .withdrawals
            .request("user-1", 500.0, bank)
            .await
            .unwrap();
        assert_eq!(withdrawal.routing_number.as_deref(), Some("021000021"));
        assert_eq!(withdrawal.ifsc_code, None);
    }

    #[tokio::test]
    async fn rejects_missing_bank_fields() {
        let fixture = create_fixture(BankRegion::Ifsc).await;
        let mut bank = ifsc_bank();
        bank.account_number = "   ".to_string();

        let err = fixture
            .withdrawals
            .request("user-1", 500.0, bank)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn full_round_trip_restores_or_settles_balance() {
        let fixture = create_fixture(BankRegion::Ifsc).await;

        // Reject path: balance restored
        let withdrawal = fixture
            .withdrawals
            .request("user-1", 600.0, ifsc_bank())
            .await
            .unwrap();
        fixture
            .withdrawals
            .decide(&withdrawal.id, WithdrawalAction::Reject, None, "admin-1")
            .await
            .unwrap();
        let profile = fixture.ledger.get_profile("user-1").await.unwrap();
        assert!((profile.earnings - 1000.0).abs() < 1e-9);

        // Approve + complete path: balance settled
        let withdrawal = fixture
            .withdrawals
            .request("user-1", 600.0, ifsc_bank())
            .await
            .unwrap();
        fixture
            .withdrawals
            .decide(&withdrawal.id, WithdrawalAction::Approve, None, "admin-1")
            .await
            .unwrap();
        let completed = fixture
            .withdrawals
            .decide(
                &withdrawal.id,
                WithdrawalAction::Complete,
                Some("transfer ref 7".to_string()),
                "admin-1",
            )
            .await
            .unwrap();
        assert_eq!(completed.status, "completed");

        let profile = fixture.ledger.get_profile("user-1").await.unwrap();
        assert!((profile.earnings - 400.0).abs() < 1e-9);
        assert!((profile.total_earnings - 600.0).abs() < 1e-9);
    }
}
