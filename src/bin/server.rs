use std::{
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppState, PaginationConfig, build_router, graceful_shutdown, logging_middleware,
};

/// The REST API server for expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "EXPENSES_DB_PATH", default_value = "expenses.db")]
    db_path: String,

    /// The IP address to listen on.
    #[arg(long, env = "EXPENSES_ADDRESS", default_value = "127.0.0.1")]
    address: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "EXPENSES_PORT", default_value_t = 8000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    ///
    /// Expenses created without a date are given today's date in this timezone.
    #[arg(long, env = "EXPENSES_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// File path to write debug logs to.
    #[arg(long, env = "EXPENSES_LOG_PATH", default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let addr = SocketAddr::from((args.address, args.port));

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let state = match AppState::new(conn, &args.timezone, PaginationConfig::default()) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the application: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging(log_path: &str) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

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
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
