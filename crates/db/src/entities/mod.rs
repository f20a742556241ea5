//! `SeaORM` entity definitions.

pub mod expenses;
pub mod users;
