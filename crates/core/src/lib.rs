//! Core business logic for Spendflow.
//!
//! This crate contains business logic with no web framework or database dependencies.
//! Persistence and the exchange-rate source are reached through traits.
//!
//! # Modules
//!
//! - `auth` - Roles, identities, password hashing and account registration
//! - `currency` - Exchange-rate tables and conversion into the base currency
//! - `workflow` - Multi-level approval state machine
//! - `expense` - Expense model, validation, repository contract and service

pub mod auth;
pub mod currency;
pub mod expense;
pub mod workflow;
