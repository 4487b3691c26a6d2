//! Defines the user model and the database queries for users.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// `daily_balance` is a cached copy of the value derived from `income` and
/// the user's transactions, see [crate::balance::compute_daily_balance].
/// The transactions are the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The ID assigned to the user by the store.
    pub id: UserId,
    /// The name to greet the user with.
    pub name: String,
    /// The user's total monthly income.
    pub income: f64,
    /// How much the user can spend per day.
    pub daily_balance: f64,
}

/// The payload for registering a user, i.e. a [User] without an ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// The name to greet the user with.
    pub name: String,
    /// The user's total monthly income.
    pub income: f64,
    /// The daily balance the user starts with.
    pub daily_balance: f64,
}

/// A partial update to a [User].
///
/// Fields set to `None` are left untouched and omitted from the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// The new name, if it should change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The new monthly income, if it should change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    /// The new daily balance, if it should change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_balance: Option<f64>,
}

impl UserPatch {
    /// A patch that only sets the daily balance.
    pub fn daily_balance(daily_balance: f64) -> Self {
        Self {
            daily_balance: Some(daily_balance),
            ..Default::default()
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                income REAL NOT NULL,
                daily_balance REAL NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn create_user(new_user: &NewUser, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "INSERT INTO user (name, income, daily_balance) VALUES (?1, ?2, ?3)
             RETURNING id, name, income, daily_balance",
        )?
        .query_row(
            (&new_user.name, new_user.income, new_user.daily_balance),
            map_user_row,
        )
        .map_err(|error| error.into())
}

/// Get every user in the database, ordered by ID.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn list_users(connection: &Connection) -> Result<Vec<User>, Error> {
    let mut statement =
        connection.prepare("SELECT id, name, income, daily_balance FROM user ORDER BY id")?;

    let users: Result<Vec<User>, Error> = statement
        .query_map([], map_user_row)?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect();

    users
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
#[cfg(test)]
pub fn get_user(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, income, daily_balance FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Apply `patch` to the user with the ID `user_id` and return the updated user.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn update_user(
    user_id: UserId,
    patch: &UserPatch,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare(
            "UPDATE user SET
                name = COALESCE(?1, name),
                income = COALESCE(?2, income),
                daily_balance = COALESCE(?3, daily_balance)
             WHERE id = ?4
             RETURNING id, name, income, daily_balance",
        )?
        .query_row(
            (
                patch.name.as_deref(),
                patch.income,
                patch.daily_balance,
                user_id.as_i64(),
            ),
            map_user_row,
        )
        .map_err(|error| error.into())
}

/// Map a database row to a User.
fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserId::new(row.get(0)?),
        name: row.get(1)?,
        income: row.get(2)?,
        daily_balance: row.get(3)?,
    })
}
