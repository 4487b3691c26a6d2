//! Reqwest-backed implementation of the remote store.
//!
//! This adapter owns transport details only: building URLs, request timeouts,
//! mapping HTTP errors and decoding JSON bodies.

use std::{num::NonZeroU64, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::{
    endpoints::{self, format_endpoint},
    store::{RemoteStore, StoreError},
    transaction::{NewTransaction, Transaction},
    user::{NewUser, User, UserId, UserPatch},
};

/// The environment variable holding the store's base URL.
pub const STORE_URL_ENV: &str = "BUDGET_STORE_URL";
/// The environment variable holding the request timeout in seconds.
pub const STORE_TIMEOUT_ENV: &str = "BUDGET_STORE_TIMEOUT_SECS";

const DEFAULT_STORE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the store lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpStoreConfig {
    /// The URL the resource paths are appended to, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// How long a single request may take before it fails.
    pub timeout: Duration,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpStoreConfig {
    /// Create a config for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the config from the [STORE_URL_ENV] and [STORE_TIMEOUT_ENV]
    /// environment variables, using the defaults for unset variables.
    ///
    /// # Errors
    /// Returns [StoreError::InvalidConfig] if the timeout is not a positive
    /// whole number of seconds.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let mut config = Self::default();

        if let Some(base_url) = lookup(STORE_URL_ENV) {
            config.base_url = base_url;
        }

        if let Some(timeout) = lookup(STORE_TIMEOUT_ENV) {
            let seconds = timeout.trim().parse::<NonZeroU64>().map_err(|error| {
                StoreError::InvalidConfig(format!(
                    "{STORE_TIMEOUT_ENV} must be a positive whole number of seconds, got \"{timeout}\": {error}"
                ))
            })?;
            config.timeout = Duration::from_secs(seconds.get());
        }

        Ok(config)
    }
}

/// A [RemoteStore] that talks JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Build a store client from `config`.
    ///
    /// # Errors
    /// Returns [StoreError::InvalidConfig] if the base URL is invalid or the
    /// HTTP client cannot be constructed.
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url).map_err(|error| {
            StoreError::InvalidConfig(format!(
                "invalid store URL \"{}\": {error}",
                config.base_url
            ))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| StoreError::InvalidConfig(error.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        send(self.client.get(self.url(endpoints::USERS))).await
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        send(self.client.post(self.url(endpoints::USERS)).json(new_user)).await
    }

    async fn update_user(&self, user_id: UserId, patch: &UserPatch) -> Result<User, StoreError> {
        let path = format_endpoint(endpoints::USER, user_id.as_i64());

        send(self.client.patch(self.url(&path)).json(patch)).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        send(self.client.get(self.url(endpoints::TRANSACTIONS))).await
    }

    async fn create_transaction(
        &self,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction, StoreError> {
        send(
            self.client
                .post(self.url(endpoints::TRANSACTIONS))
                .json(new_transaction),
        )
        .await
    }
}

/// Send `request` and decode a successful JSON response body into `T`.
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, StoreError> {
    let response = request.send().await.map_err(map_transport_error)?;

    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;

    if !status.is_success() {
        return Err(StoreError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    serde_json::from_slice(&body).map_err(|error| StoreError::Decode(error.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> StoreError {
    StoreError::Transport(error.to_string())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use crate::store::StoreError;

    use super::{HttpStore, HttpStoreConfig, STORE_TIMEOUT_ENV, STORE_URL_ENV};

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn config_defaults_without_env() {
        let config = HttpStoreConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, HttpStoreConfig::default());
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn config_reads_env() {
        let config = HttpStoreConfig::from_lookup(lookup_from(&[
            (STORE_URL_ENV, "http://budget.local:8080/api"),
            (STORE_TIMEOUT_ENV, "3"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://budget.local:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn config_rejects_bad_timeout() {
        let result = HttpStoreConfig::from_lookup(lookup_from(&[(STORE_TIMEOUT_ENV, "soon")]));

        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let result = HttpStoreConfig::from_lookup(lookup_from(&[(STORE_TIMEOUT_ENV, "0")]));

        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn store_rejects_bad_url() {
        let result = HttpStore::new(HttpStoreConfig::new("not a url"));

        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn urls_keep_base_path() {
        let store = HttpStore::new(HttpStoreConfig::new("http://budget.local:8080/api/")).unwrap();

        assert_eq!(store.url("/users"), "http://budget.local:8080/api/users");
    }
}
