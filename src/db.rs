//! Sets up the SQLite database used by the reference store server.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{transaction::create_transaction_table, user::create_user_table};

/// Create the tables for the domain models if they do not exist yet.
///
/// The tables are created inside a single exclusive transaction, so either
/// every table exists afterwards or none were added.
///
/// # Errors
/// Returns an error if a table could not be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("first initialization failed");
        initialize(&conn).expect("second initialization failed");

        let table_count: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('user', 'transaction')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 2);
    }
}
