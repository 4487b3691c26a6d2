//! Daily budget tracking over a remote REST store.
//!
//! A user registers with a monthly income, records income and expense
//! transactions, and reads back a daily spending allowance and a breakdown of
//! expenses by category.
//!
//! The library has three layers:
//! - [store]: the [RemoteStore] trait and its HTTP implementation [HttpStore].
//! - [balance]: the daily balance calculation and category breakdown.
//! - [session]: the [Session] that holds the current user and transactions and
//!   keeps the derived balance up to date.
//!
//! It also contains a small reference store server (see [build_router]) that
//! serves the REST resources from a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
pub mod balance;
mod db;
pub mod endpoints;
mod logging;
mod routing;
pub mod session;
pub mod store;
pub mod transaction;
pub mod user;

pub use app_state::AppState;
pub use balance::{compute_daily_balance, expenses_by_category};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use session::{Session, SessionConfig, SessionStatus, UserSelection};
pub use store::{HttpStore, HttpStoreConfig, RemoteStore, StoreError};
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionType};
pub use user::{NewUser, User, UserId, UserPatch};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A listing call against the remote store failed.
    ///
    /// Callers should treat the affected state as empty or stale and may
    /// retry later.
    #[error("could not read from the store: {0}")]
    StoreRead(StoreError),

    /// A create or update call against the remote store failed.
    ///
    /// The attempted mutation did not take effect remotely and local state
    /// does not reflect it.
    #[error("could not write to the store: {0}")]
    StoreWrite(StoreError),

    /// An operation that needs a current user was attempted before a user
    /// was registered or loaded.
    #[error("no active user, register or load a user first")]
    NoActiveUser,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A transaction value was zero, negative or not a finite number.
    ///
    /// The sign of a transaction comes from its type, so the value itself
    /// must always be positive.
    #[error("{0} is not a valid transaction value, it must be a positive number")]
    InvalidTransactionValue(f64),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A request body could not be read or was too large to buffer.
    #[error("the request body could not be read or is too large")]
    BodyTooLarge,

    /// A response body could not be read after the handler produced it.
    #[error("the response body could not be read")]
    ResponseBody,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::InvalidTransactionValue(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            Error::DatabaseLockError => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            Error::BodyTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an unexpected error occurred, check the server logs".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
