/// API route handlers
///
/// - `health`: health check
/// - `auth`: signup, login, logout, current account
/// - `usage`: monthly quota status and history
/// - `analyse`: metered complaint analysis
/// - `claims`: claims dashboard
/// - `early_access`: early-access mailing list
/// - `contact`: contact form

pub mod analyse;
pub mod auth;
pub mod claims;
pub mod contact;
pub mod early_access;
pub mod health;
pub mod usage;
