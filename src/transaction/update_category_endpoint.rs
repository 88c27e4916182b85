//! Defines the route handler for changing a transaction's category.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::CategorySet,
    database_id::TransactionId,
    extract::{ApiJson, ApiPath},
};

use super::core::{Transaction, update_transaction_category};

/// The state needed to update a transaction's category.
#[derive(Debug, Clone)]
pub struct UpdateCategoryState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The categories a transaction may be assigned.
    pub categories: Arc<CategorySet>,
}

impl FromRef<AppState> for UpdateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            categories: state.categories.clone(),
        }
    }
}

/// The request body for updating a transaction's category.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    /// The new category.
    pub category: String,
}

/// Route handler for changing the category of a single transaction.
///
/// Responds with the updated transaction.
pub async fn update_category_endpoint(
    State(state): State<UpdateCategoryState>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiJson(request): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = update_transaction_category(
        transaction_id,
        &request.category,
        &state.categories,
        &connection,
    )
    .inspect_err(|error| {
        tracing::debug!("Could not update category of transaction {transaction_id}: {error}")
    })?;

    tracing::info!(
        "Set category of transaction {transaction_id} to \"{}\"",
        transaction.category
    );

    Ok(Json(transaction))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        category::CategorySet,
        db::initialize,
        extract::{ApiJson, ApiPath},
        transaction::{get_transaction, test_utils::insert_scenario_transactions},
    };

    use super::{UpdateCategoryRequest, UpdateCategoryState, update_category_endpoint};

    fn get_test_state() -> UpdateCategoryState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        insert_scenario_transactions(&conn);

        UpdateCategoryState {
            db_connection: Arc::new(Mutex::new(conn)),
            categories: Arc::new(CategorySet::default()),
        }
    }

    fn request(category: &str) -> ApiJson<UpdateCategoryRequest> {
        ApiJson(UpdateCategoryRequest {
            category: category.to_owned(),
        })
    }

    #[tokio::test]
    async fn can_update_category() {
        let state = get_test_state();

        let Json(got) = update_category_endpoint(State(state.clone()), ApiPath(4), request("Travel"))
            .await
            .expect("could not update category");

        assert_eq!(got.id, 4);
        assert_eq!(got.category, "Travel");
        let stored = get_transaction(4, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(stored, got);
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let state = get_test_state();

        let response = update_category_endpoint(State(state), ApiPath(999), request("Travel"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn all_sentinel_is_bad_request() {
        let state = get_test_state();

        let response = update_category_endpoint(State(state), ApiPath(1), request("All"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
