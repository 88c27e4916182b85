use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use ledger_browser::{AppState, CategorySet, PaginationConfig, build_router, graceful_shutdown};

/// The REST API server for browsing bank transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: PathBuf,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// File path to a JSON file listing the categories a transaction may be
    /// assigned, e.g. `{"version": 2, "categories": ["Groceries", "Rent"]}`.
    /// The built-in categories are used if omitted.
    #[arg(long)]
    categories_path: Option<PathBuf>,

    /// The largest page a client may request.
    #[arg(long, default_value_t = 100)]
    page_size_limit: u64,

    /// Also write debug level logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(args.log_file.as_deref());

    let categories = match &args.categories_path {
        Some(path) => CategorySet::from_json_file(path).unwrap_or_else(|error| {
            panic!("Could not load categories from {}: {error}", path.display())
        }),
        None => CategorySet::default(),
    };
    tracing::info!(
        "Using category set version {} with {} categories",
        categories.version(),
        categories.names().count()
    );

    let default_config = PaginationConfig::default();
    let pagination_config = PaginationConfig {
        default_page_size: default_config.default_page_size.min(args.page_size_limit),
        max_page_size: args.page_size_limit,
        ..default_config
    };

    let conn = Connection::open(&args.db_path).unwrap_or_else(|error| {
        panic!(
            "Could not open database file {}: {error}",
            args.db_path.display()
        )
    });
    let state = AppState::new(conn, pagination_config, categories)
        .expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server exited with an error");
}

fn setup_logging(log_file: Option<&Path>) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty().with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    let debug_log = log_file.map(|path| {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("Could not create log file");

        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(Arc::new(log_file))
            .with_filter(filter::LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
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
        // Errors are logged where they are converted to responses.
        .on_failure(());

    router.layer(tracing_layer)
}
