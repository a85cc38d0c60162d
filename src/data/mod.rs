//! Data layer module
//!
//! Handles all data persistence and change notification:
//! - SQLite database operations
//! - In-process record change hub

mod database;
mod events;
mod models;

pub use database::{Database, WithdrawalDecision};
pub use events::{Collection, EventHub, RecordChange};
pub use models::*;
