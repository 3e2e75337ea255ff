//! SeaORM entities for the `admins`, `employees` and `attendance` tables.

pub mod prelude;

pub mod admins;
pub mod attendance;
pub mod employees;
pub mod sea_orm_active_enums;
