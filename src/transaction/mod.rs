//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing and querying transactions
//! - Route handlers for the reference store server

mod core;
mod endpoints;

pub use core::{
    NewTransaction, Transaction, TransactionBuilder, TransactionId, TransactionType,
    create_transaction_table,
};
pub use endpoints::{create_transaction_endpoint, list_transactions_endpoint};
