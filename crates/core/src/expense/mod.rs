//! Expense reports.
//!
//! # Modules
//!
//! - `model` - Expense record and submission input
//! - `validation` - Input checks run before any state change
//! - `repository` - Persistence trait with compare-and-swap status updates
//! - `memory` - In-memory repository
//! - `service` - Submission, approval and listing
//! - `error` - Expense error types

pub mod error;
pub mod memory;
pub mod model;
pub mod repository;
pub mod service;
pub mod validation;


pub use error::ExpenseError;
pub use memory::InMemoryExpenseRepository;
pub use model::{Expense, NewExpense};
pub use repository::{ExpenseRepository, RepositoryError, StatusUpdate};
pub use service::{ExpenseService, Scope};
pub use validation::{ValidExpense, ValidationError, validate};
