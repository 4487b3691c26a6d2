//! The in-memory state of a budgeting session.
//!
//! A [Session] owns the current user and the list of transactions, and is the
//! only way to change them. Every mutating operation calls the [RemoteStore]
//! first and only touches local state once the store accepted the change.
//!
//! Mutating operations are serialized: the state lock is held for the whole
//! operation, including the remote calls, so two concurrent calls to
//! [Session::record_transaction] run one after the other in the order they
//! acquired the lock.

use std::collections::BTreeMap;

use tokio::sync::Mutex;

use crate::{
    Error,
    balance::{compute_daily_balance, expenses_by_category, initial_daily_balance},
    store::{RemoteStore, StoreError},
    transaction::{Transaction, TransactionBuilder},
    user::{NewUser, User, UserId, UserPatch},
};

/// Which of the store's users becomes the current user when loading a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSelection {
    /// The first user returned by the store.
    #[default]
    First,
    /// The user at this position in the list returned by the store.
    Index(usize),
    /// The user with this ID.
    Id(UserId),
}

impl UserSelection {
    fn select(&self, users: Vec<User>) -> Option<User> {
        match self {
            UserSelection::First => users.into_iter().next(),
            UserSelection::Index(index) => users.into_iter().nth(*index),
            UserSelection::Id(user_id) => users.into_iter().find(|user| user.id == *user_id),
        }
    }
}

/// Settings for a [Session].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Which user to adopt in [Session::load_initial_data].
    pub user_selection: UserSelection,
}

/// Whether the session has a current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No user has been registered or loaded yet.
    NoUser,
    /// A user has been registered or loaded.
    HasUser,
}

/// A problem with keeping the cached daily balance in sync that did not stop
/// a transaction from being recorded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncWarning {
    /// The transactions could not be fetched from the store, so the balance
    /// was calculated from the transactions held locally.
    #[error("could not refresh transactions, balance was calculated from local state: {0}")]
    TransactionsNotRefreshed(StoreError),

    /// The new daily balance could not be saved to the store. The local
    /// user still has the new balance.
    #[error("could not save the new daily balance: {0}")]
    BalanceNotSaved(StoreError),
}

/// The result of recording a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTransaction {
    /// The transaction as stored, including its store-assigned ID.
    pub transaction: Transaction,
    /// The user's new daily balance.
    pub daily_balance: f64,
    /// Problems updating the cached balance. Empty if everything was synced.
    pub warnings: Vec<SyncWarning>,
}

/// What happened while loading a session's initial data.
#[derive(Debug, Default, PartialEq)]
pub struct LoadReport {
    /// Set if the users could not be fetched. The transactions are not
    /// fetched in that case.
    pub user_error: Option<Error>,
    /// Set if the transactions could not be fetched.
    pub transactions_error: Option<Error>,
}

impl LoadReport {
    /// Whether all data was loaded without errors.
    pub fn is_complete(&self) -> bool {
        self.user_error.is_none() && self.transactions_error.is_none()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    current_user: Option<User>,
    transactions: Vec<Transaction>,
}

/// The current user and their transactions, backed by a [RemoteStore].
pub struct Session<S> {
    store: S,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl<S: RemoteStore> Session<S> {
    /// Create an empty session, i.e. with no user and no transactions.
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Fetch the users and transactions from the store.
    ///
    /// The user picked by [SessionConfig::user_selection] becomes the current
    /// user and the transactions replace the local ones. Failures never
    /// escape: they are logged and reported in the returned [LoadReport], and
    /// the affected state is left as it was.
    pub async fn load_initial_data(&self) -> LoadReport {
        let mut state = self.state.lock().await;
        let mut report = LoadReport::default();

        let users = match self.store.list_users().await {
            Ok(users) => users,
            Err(error) => {
                tracing::error!("Error fetching users: {error}");
                report.user_error = Some(Error::StoreRead(error));
                return report;
            }
        };

        let user_count = users.len();
        match self.config.user_selection.select(users) {
            Some(user) => {
                tracing::info!("Loaded user {} ({})", user.id, user.name);
                state.current_user = Some(user);
            }
            None => tracing::info!(
                "No user matches {:?} among {user_count} users",
                self.config.user_selection
            ),
        }

        match self.store.list_transactions().await {
            Ok(transactions) => {
                tracing::info!("Loaded {} transactions", transactions.len());
                state.transactions = transactions;
            }
            Err(error) => {
                tracing::error!("Error fetching transactions: {error}");
                report.transactions_error = Some(Error::StoreRead(error));
            }
        }

        report
    }

    /// Register a new user with a monthly income and make them the current user.
    ///
    /// The user starts with a daily balance of `monthly_income / 30`.
    ///
    /// # Errors
    /// Returns [Error::StoreWrite] if the store rejected the user, in which
    /// case the session is left unchanged.
    pub async fn register_user(&self, name: &str, monthly_income: f64) -> Result<User, Error> {
        let mut state = self.state.lock().await;

        let new_user = NewUser {
            name: name.to_owned(),
            income: monthly_income,
            daily_balance: initial_daily_balance(monthly_income),
        };

        let user = self.store.create_user(&new_user).await.map_err(|error| {
            tracing::error!("Error creating new user: {error}");
            Error::StoreWrite(error)
        })?;

        tracing::info!("Registered user {} ({})", user.id, user.name);
        state.current_user = Some(user.clone());

        Ok(user)
    }

    /// Record a transaction for the current user and update their daily balance.
    ///
    /// Creating the transaction in the store is the part that must succeed.
    /// Once it has, the transaction is added to the local list and the daily
    /// balance is recalculated from the store's full transaction list and
    /// saved back to the store. Failures in that second part are logged and
    /// returned as [RecordedTransaction::warnings], and the local user gets
    /// the new balance either way.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NoActiveUser] if there is no current user,
    /// - or [Error::StoreWrite] if the store rejected the transaction.
    ///
    /// The session is left unchanged in both cases.
    pub async fn record_transaction(
        &self,
        transaction: TransactionBuilder,
    ) -> Result<RecordedTransaction, Error> {
        let mut state = self.state.lock().await;

        let Some(user) = state.current_user.clone() else {
            tracing::error!("Tried to record a transaction without an active user");
            return Err(Error::NoActiveUser);
        };

        let transaction = self
            .store
            .create_transaction(&transaction.for_user(user.id))
            .await
            .map_err(|error| {
                tracing::error!("Error creating transaction: {error}");
                Error::StoreWrite(error)
            })?;

        state.transactions.push(transaction.clone());

        let mut warnings = Vec::new();

        let daily_balance = match self.store.list_transactions().await {
            Ok(transactions) => compute_daily_balance(user.income, &transactions),
            Err(error) => {
                tracing::warn!(
                    "Could not refresh transactions, using local transactions instead: {error}"
                );
                warnings.push(SyncWarning::TransactionsNotRefreshed(error));
                compute_daily_balance(user.income, &state.transactions)
            }
        };

        if let Err(error) = self
            .store
            .update_user(user.id, &UserPatch::daily_balance(daily_balance))
            .await
        {
            tracing::warn!("Could not save daily balance for user {}: {error}", user.id);
            warnings.push(SyncWarning::BalanceNotSaved(error));
        }

        if let Some(current_user) = state.current_user.as_mut() {
            current_user.daily_balance = daily_balance;
        }

        tracing::info!(
            "Recorded {} transaction {}, daily balance is now {daily_balance}",
            transaction.kind,
            transaction.id
        );

        Ok(RecordedTransaction {
            transaction,
            daily_balance,
            warnings,
        })
    }

    /// Whether the session has a current user.
    pub async fn status(&self) -> SessionStatus {
        match self.state.lock().await.current_user {
            Some(_) => SessionStatus::HasUser,
            None => SessionStatus::NoUser,
        }
    }

    /// A copy of the current user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.state.lock().await.current_user.clone()
    }

    /// The current user's daily balance, if there is a current user.
    pub async fn daily_balance(&self) -> Option<f64> {
        self.state
            .lock()
            .await
            .current_user
            .as_ref()
            .map(|user| user.daily_balance)
    }

    /// A copy of the transactions held by the session.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }

    /// The total spent per category across the session's transactions.
    pub async fn expenses_by_category(&self) -> BTreeMap<String, f64> {
        expenses_by_category(&self.state.lock().await.transactions)
    }
}
