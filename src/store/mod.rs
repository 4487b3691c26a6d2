//! The boundary between the session and the remote store of users and transactions.
//!
//! [RemoteStore] describes the five operations the store offers. Each call is
//! a single request and response: there are no retries, no caching and no
//! idempotency keys, so from the caller's point of view every call happens at
//! most once.

mod http;

use async_trait::async_trait;

use crate::{
    transaction::{NewTransaction, Transaction},
    user::{NewUser, User, UserId, UserPatch},
};

pub use http::{HttpStore, HttpStoreConfig};

/// The ways a call to the remote store can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The request could not be sent or the response could not be received,
    /// e.g. the store is offline or the request timed out.
    #[error("could not reach the store: {0}")]
    Transport(String),

    /// The store answered with a non-success status code.
    #[error("the store responded with status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, usually a JSON error message.
        body: String,
    },

    /// The store's response could not be decoded into the expected type.
    #[error("could not decode the store's response: {0}")]
    Decode(String),

    /// The client for the store was configured with invalid settings.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// The operations offered by the remote store.
///
/// Implementations only move data, all business logic lives in
/// [crate::session::Session].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Get every registered user.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Register a user, returning it with the ID assigned by the store.
    async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError>;

    /// Apply a partial update to a user, returning the updated user.
    async fn update_user(&self, user_id: UserId, patch: &UserPatch) -> Result<User, StoreError>;

    /// Get every recorded transaction.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError>;

    /// Record a transaction, returning it with the ID assigned by the store.
    async fn create_transaction(
        &self,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction, StoreError>;
}
