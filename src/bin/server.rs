use std::{fs::OpenOptions, net::SocketAddr, path::PathBuf, process::ExitCode, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerview_rs::{
    AppState, build_router,
    config::{ConfigError, ProviderConfig},
    get_local_offset, graceful_shutdown,
    pagination::PaginationConfig,
    provider::{LinkedItems, PlaidClient, PlaidProvider},
};

/// The dashboard data server for ledgerview_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON file listing the user and their linked bank items.
    #[arg(long)]
    items_path: PathBuf,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone used to display dates, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    let args = Args::parse();

    let state = match create_app_state(&args) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            return ExitCode::FAILURE;
        }
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn create_app_state(args: &Args) -> Result<AppState<PlaidProvider>, ConfigError> {
    if get_local_offset(&args.timezone).is_none() {
        return Err(ConfigError::InvalidTimezone(args.timezone.clone()));
    }

    let config = ProviderConfig::from_env()?;
    tracing::info!("Using the Plaid {:?} environment", config.environment());

    let items = LinkedItems::load(&args.items_path)?;
    tracing::info!(
        "Loaded {} linked items from {}",
        items.items.len(),
        args.items_path.display()
    );

    let provider = PlaidProvider::new(PlaidClient::new(config), items);

    Ok(AppState::new(
        provider,
        &args.timezone,
        PaginationConfig::default(),
    ))
}

fn setup_logging() -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are mapped to responses.
        .on_failure(());

    router.layer(tracing_layer)
}
