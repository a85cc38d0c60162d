//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database operations and change notification.

mod ledger;
mod submission;
mod withdrawal;

pub use ledger::LedgerService;
pub use submission::SubmissionService;
pub use withdrawal::{BankDetails, WithdrawalAction, WithdrawalService};
