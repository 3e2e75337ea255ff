//! Password hashing, bearer tokens and role-checking extractors.

pub mod extract;
pub mod password;
pub mod token;

pub use extract::{CurrentAdmin, RequireAdmin, RequireStaff};
pub use token::Claims;
