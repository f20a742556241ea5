//! Repository abstractions for data access.
//!
//! Repositories implement the persistence traits from `spendflow-core`,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod expense;
pub mod user;

pub use expense::SeaOrmExpenseRepository;
pub use user::SeaOrmUserStore;
