//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, user::UserId};

// ============================================================================
// MODELS
// ============================================================================

/// A newtype wrapper for integer transaction IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TransactionId(i64);

impl TransactionId {
    /// Create a new transaction ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the transaction ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether money was earned or spent.
///
/// The type decides the sign of a transaction's contribution to the balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, adds to the balance.
    Income,
    /// Money spent, subtracts from the balance.
    Expense,
}

impl TransactionType {
    /// The name used for this type on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type \"{other}\"").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID assigned to the transaction by the store.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserId,
    /// A short description of what the transaction was for.
    pub name: String,
    /// How much money was spent or earned. Always positive, see `kind`.
    pub value: f64,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// A free text label used to group transactions, e.g. "Groceries".
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        name: &str,
        value: f64,
        kind: TransactionType,
        category: &str,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            name: name.to_owned(),
            value,
            kind,
            category: category.to_owned(),
            date,
        }
    }

    /// The transaction's contribution to a balance: `value` for income and
    /// `-value` for expenses.
    pub fn signed_value(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.value,
            TransactionType::Expense => -self.value,
        }
    }
}

/// The details of a transaction entered by a user, before it is tied to a
/// user and sent to the store.
///
/// # Examples
///
/// ```
/// use time::macros::date;
///
/// use daily_budget::{Transaction, TransactionType, UserId};
///
/// let new_transaction = Transaction::build(
///         "Groceries",
///         45.99,
///         TransactionType::Expense,
///         "Food",
///         date!(2025 - 01 - 15),
///     )
///     .for_user(UserId::new(1));
///
/// assert_eq!(new_transaction.user_id, UserId::new(1));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A short description of what the transaction was for.
    pub name: String,
    /// How much money was spent or earned. Always positive, see `kind`.
    pub value: f64,
    /// Whether the money was earned or spent.
    pub kind: TransactionType,
    /// A free text label used to group transactions.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
}

impl TransactionBuilder {
    /// Attach the transaction to `user_id`, producing the payload for the store.
    pub fn for_user(self, user_id: UserId) -> NewTransaction {
        NewTransaction {
            user_id,
            name: self.name,
            value: self.value,
            kind: self.kind,
            category: self.category,
            date: self.date,
        }
    }
}

/// The payload for creating a transaction, i.e. a [Transaction] without an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// The user that recorded the transaction.
    pub user_id: UserId,
    /// A short description of what the transaction was for.
    pub name: String,
    /// How much money was spent or earned. Always positive, see `kind`.
    pub value: f64,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// A free text label used to group transactions.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTransactionValue] if the value is not a positive, finite number,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !new_transaction.value.is_finite() || new_transaction.value <= 0.0 {
        return Err(Error::InvalidTransactionValue(new_transaction.value));
    }

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, name, value, type, category, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, name, value, type, category, date",
        )?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                &new_transaction.name,
                new_transaction.value,
                new_transaction.kind,
                &new_transaction.category,
                new_transaction.date,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get every transaction in the database, ordered by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn list_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, user_id, name, value, type, category, date FROM \"transaction\" ORDER BY id",
    )?;

    let transactions: Result<Vec<Transaction>, Error> = statement
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect();

    transactions
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                value REAL NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: TransactionId::new(row.get(0)?),
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        value: row.get(3)?,
        kind: row.get(4)?,
        category: row.get(5)?,
        date: row.get(6)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
