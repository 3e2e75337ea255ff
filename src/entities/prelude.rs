pub use super::admins::Entity as Admins;
pub use super::attendance::Entity as Attendance;
pub use super::employees::Entity as Employees;
