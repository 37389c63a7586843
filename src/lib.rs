//! Ledgerview is a banking dashboard data service.
//!
//! This library reads a user's accounts and transactions from a bank data
//! provider, adds the dashboard's demo deposits and serves the resulting view
//! model as JSON.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
pub mod categories;
pub mod config;
mod dashboard;
mod endpoints;
mod error;
pub mod format;
mod logging;
pub mod pagination;
pub mod provider;
pub mod query;
mod routing;
pub mod status;
pub mod synthetic;
mod timestamp;
mod timezone;
pub mod transaction;

pub use app_state::AppState;
pub use dashboard::{DashboardData, TransactionView};
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
