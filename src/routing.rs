//! Application router configuration.

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    category::{get_categories_endpoint, get_category_names_endpoint},
    csv_import::load_csv_endpoint,
    endpoints,
    logging::logging_middleware,
    transaction::{get_transactions_endpoint, update_category_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_api_info))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(
            endpoints::TRANSACTION_CATEGORY,
            patch(update_category_endpoint),
        )
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::CATEGORY_NAMES, get(get_category_names_endpoint))
        .route(endpoints::LOAD_CSV, post(load_csv_endpoint))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The root path '/' lists the available endpoints.
async fn get_api_info() -> Json<Value> {
    Json(json!({
        "message": "Transaction browser API",
        "endpoints": {
            "transactions": endpoints::TRANSACTIONS,
            "update_category": endpoints::TRANSACTION_CATEGORY,
            "categories": endpoints::CATEGORIES,
            "category_names": endpoints::CATEGORY_NAMES,
            "load_csv": endpoints::LOAD_CSV,
        }
    }))
}

async fn get_404_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {uri}");

    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": format!("No route for {}", uri.path()) })),
    )
        .into_response()
}
