//! Implements a struct that holds the state of the dashboard server.

use std::sync::Arc;

use crate::{pagination::PaginationConfig, provider::BankDataProvider};

/// The state of the dashboard server.
#[derive(Debug)]
pub struct AppState<P> {
    /// Where account and transaction data comes from.
    pub provider: Arc<P>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl<P: BankDataProvider> AppState<P> {
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(provider: P, local_timezone: &str, pagination_config: PaginationConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            local_timezone: local_timezone.to_owned(),
            pagination_config,
        }
    }
}

// Derived `Clone` would require `P: Clone`.
impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            local_timezone: self.local_timezone.clone(),
            pagination_config: self.pagination_config.clone(),
        }
    }
}
