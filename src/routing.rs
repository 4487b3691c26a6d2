//! Router configuration for the reference store server.

use axum::{
    Router,
    routing::{get, patch},
};

use crate::{
    AppState, Error, endpoints,
    transaction::{create_transaction_endpoint, list_transactions_endpoint},
    user::{create_user_endpoint, list_users_endpoint, update_user_endpoint},
};

/// Return a router with all the store's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::USERS,
            get(list_users_endpoint).post(create_user_endpoint),
        )
        .route(endpoints::USER, patch(update_user_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
