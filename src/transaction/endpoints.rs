//! Defines the endpoints for listing and creating transactions.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, Error,
    transaction::{
        NewTransaction, Transaction,
        core::{create_transaction, list_transactions},
    },
};

/// A route handler that returns every transaction as JSON.
pub async fn list_transactions_endpoint(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state.lock_connection()?;

    list_transactions(&connection)
        .map(Json)
        .inspect_err(|error| {
            tracing::error!("could not list transactions: {error}");
        })
}

/// A route handler for creating a new transaction.
///
/// Responds with `201 Created` and the stored transaction, or
/// `422 Unprocessable Entity` if the value is not a positive number.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Json(new_transaction): Json<NewTransaction>,
) -> Response {
    let connection = match state.lock_connection() {
        Ok(connection) => connection,
        Err(error) => return error.into_response(),
    };

    match create_transaction(&new_transaction, &connection) {
        Ok(transaction) => {
            tracing::info!(
                "Created {} transaction {} for user {}",
                transaction.kind,
                transaction.id,
                transaction.user_id
            );
            (StatusCode::CREATED, Json(transaction)).into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        AppState, endpoints,
        transaction::{Transaction, TransactionType},
        user::UserId,
    };

    use super::{create_transaction_endpoint, list_transactions_endpoint};

    fn get_test_server() -> TestServer {
        let state = AppState::new(Connection::open_in_memory().unwrap())
            .expect("Could not create app state");
        let app = Router::new()
            .route(
                endpoints::TRANSACTIONS,
                get(list_transactions_endpoint).post(create_transaction_endpoint),
            )
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "userId": 1,
                "name": "Coffee",
                "value": 4.5,
                "type": "expense",
                "category": "Food",
                "date": "2025-10-05",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.user_id, UserId::new(1));
        assert_eq!(transaction.name, "Coffee");
        assert_eq!(transaction.value, 4.5);
        assert_eq!(transaction.kind, TransactionType::Expense);
        assert_eq!(transaction.date, date!(2025 - 10 - 05));
    }

    #[tokio::test]
    async fn list_returns_created_transactions() {
        let server = get_test_server();
        let mut want = Vec::new();
        for (name, value, kind) in [("Salary", 500.0, "income"), ("Rent", 200.0, "expense")] {
            let created = server
                .post(endpoints::TRANSACTIONS)
                .json(&json!({
                    "userId": 1,
                    "name": name,
                    "value": value,
                    "type": kind,
                    "category": "General",
                    "date": "2025-10-05",
                }))
                .await
                .json::<Transaction>();
            want.push(created);
        }

        let got = server
            .get(endpoints::TRANSACTIONS)
            .await
            .json::<Vec<Transaction>>();

        assert_eq!(got, want);
    }

    #[tokio::test]
    async fn create_fails_with_negative_value() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "userId": 1,
                "name": "Refund",
                "value": -10.0,
                "type": "income",
                "category": "Misc",
                "date": "2025-10-05",
            }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_json(&json!([]));
    }

    #[tokio::test]
    async fn create_fails_with_unknown_type() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "userId": 1,
                "name": "Gift",
                "value": 10.0,
                "type": "transfer",
                "category": "Misc",
                "date": "2025-10-05",
            }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
