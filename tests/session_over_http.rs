//! Drives a [Session] backed by [HttpStore] against the reference store server.

use std::net::SocketAddr;

use rusqlite::Connection;
use time::macros::date;
use tokio::net::TcpListener;

use daily_budget::{
    AppState, HttpStore, HttpStoreConfig, RemoteStore, Session, SessionConfig, SessionStatus,
    StoreError, Transaction, TransactionType, UserId, UserPatch, build_router, session::SyncWarning,
};

async fn spawn_store() -> SocketAddr {
    let state = AppState::new(Connection::open_in_memory().unwrap())
        .expect("Could not create app state");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    addr
}

fn http_store(addr: SocketAddr) -> HttpStore {
    HttpStore::new(HttpStoreConfig::new(&format!("http://{addr}"))).unwrap()
}

#[tokio::test]
async fn register_and_record_transactions() {
    let addr = spawn_store().await;
    let session = Session::new(http_store(addr), SessionConfig::default());

    let user = session.register_user("Ana", 3000.0).await.unwrap();
    assert_eq!(user.daily_balance, 100.0);

    let salary = session
        .record_transaction(Transaction::build(
            "Salary",
            500.0,
            TransactionType::Income,
            "Work",
            date!(2025 - 03 - 01),
        ))
        .await
        .unwrap();
    let groceries = session
        .record_transaction(Transaction::build(
            "Groceries",
            200.0,
            TransactionType::Expense,
            "Food",
            date!(2025 - 03 - 02),
        ))
        .await
        .unwrap();

    assert!(salary.warnings.is_empty());
    assert!(groceries.warnings.is_empty());
    assert_eq!(groceries.daily_balance, 400.0);
    assert_eq!(session.daily_balance().await, Some(400.0));
    assert_eq!(session.transactions().await.len(), 2);

    let stored_users = http_store(addr).list_users().await.unwrap();
    assert_eq!(stored_users.len(), 1);
    assert_eq!(stored_users[0].id, user.id);
    assert_eq!(stored_users[0].daily_balance, 400.0);

    let stored_transactions = http_store(addr).list_transactions().await.unwrap();
    assert_eq!(
        stored_transactions,
        vec![salary.transaction, groceries.transaction]
    );
}

#[tokio::test]
async fn a_new_session_loads_the_stored_state() {
    let addr = spawn_store().await;
    let first_session = Session::new(http_store(addr), SessionConfig::default());
    first_session.register_user("Ana", 1500.0).await.unwrap();
    first_session
        .record_transaction(Transaction::build(
            "Bus",
            5.0,
            TransactionType::Expense,
            "Transport",
            date!(2025 - 03 - 03),
        ))
        .await
        .unwrap();

    let second_session = Session::new(http_store(addr), SessionConfig::default());
    let report = second_session.load_initial_data().await;

    assert!(report.is_complete());
    assert_eq!(second_session.status().await, SessionStatus::HasUser);
    assert_eq!(second_session.daily_balance().await, Some(45.0));
    assert_eq!(second_session.transactions().await.len(), 1);
    assert_eq!(second_session.expenses_by_category().await["Transport"], 5.0);
}

#[tokio::test]
async fn rejected_transaction_is_a_store_write_error() {
    let addr = spawn_store().await;
    let session = Session::new(http_store(addr), SessionConfig::default());
    session.register_user("Ana", 3000.0).await.unwrap();

    let result = session
        .record_transaction(Transaction::build(
            "Nothing",
            0.0,
            TransactionType::Expense,
            "Misc",
            date!(2025 - 03 - 04),
        ))
        .await;

    match result {
        Err(daily_budget::Error::StoreWrite(StoreError::Status { status, .. })) => {
            assert_eq!(status, 422)
        }
        other => panic!("want a store write error with status 422, got {other:?}"),
    }
    assert!(session.transactions().await.is_empty());
    assert_eq!(session.daily_balance().await, Some(100.0));
}

#[tokio::test]
async fn updating_a_missing_user_is_a_status_error() {
    let addr = spawn_store().await;

    let result = http_store(addr)
        .update_user(UserId::new(99), &UserPatch::daily_balance(1.0))
        .await;

    assert!(
        matches!(result, Err(StoreError::Status { status: 404, .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn unreachable_store_degrades_to_empty_session() {
    // Bind and drop a listener so the port is very likely closed.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let session = Session::new(http_store(addr), SessionConfig::default());

    let report = session.load_initial_data().await;

    assert!(matches!(
        report.user_error,
        Some(daily_budget::Error::StoreRead(StoreError::Transport(_)))
    ));
    assert_eq!(session.status().await, SessionStatus::NoUser);
    assert!(session.transactions().await.is_empty());
}

#[tokio::test]
async fn balance_write_failure_is_reported_as_warning() {
    use async_trait::async_trait;
    use daily_budget::{NewTransaction, NewUser, User};

    /// Forwards to the HTTP store but refuses to update users.
    struct ReadOnlyUsers(HttpStore);

    #[async_trait]
    impl RemoteStore for ReadOnlyUsers {
        async fn list_users(&self) -> Result<Vec<User>, StoreError> {
            self.0.list_users().await
        }

        async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
            self.0.create_user(new_user).await
        }

        async fn update_user(&self, _: UserId, _: &UserPatch) -> Result<User, StoreError> {
            Err(StoreError::Status {
                status: 503,
                body: "read only".to_owned(),
            })
        }

        async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
            self.0.list_transactions().await
        }

        async fn create_transaction(
            &self,
            new_transaction: &NewTransaction,
        ) -> Result<Transaction, StoreError> {
            self.0.create_transaction(new_transaction).await
        }
    }

    let addr = spawn_store().await;
    let session = Session::new(ReadOnlyUsers(http_store(addr)), SessionConfig::default());
    session.register_user("Ana", 3000.0).await.unwrap();

    let recorded = session
        .record_transaction(Transaction::build(
            "Dinner",
            40.0,
            TransactionType::Expense,
            "Food",
            date!(2025 - 03 - 05),
        ))
        .await
        .unwrap();

    assert_eq!(recorded.daily_balance, 60.0);
    assert!(matches!(
        recorded.warnings.as_slice(),
        [SyncWarning::BalanceNotSaved(StoreError::Status { status: 503, .. })]
    ));
    assert_eq!(session.daily_balance().await, Some(60.0));
    assert_eq!(
        http_store(addr).list_users().await.unwrap()[0].daily_balance,
        100.0
    );
}
