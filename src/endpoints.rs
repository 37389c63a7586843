//! The API endpoint URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard view model for a linked bank.
pub const DASHBOARD_VIEW: &str = "/dashboard";
