//! Dashboard module
//!
//! Builds the overview of a linked bank: the balance, the recent
//! transactions with the synthetic deposits merged in, and the top
//! spending categories.

mod handlers;
mod view;

pub use handlers::get_dashboard_page;
pub use view::{DashboardData, TransactionView};
