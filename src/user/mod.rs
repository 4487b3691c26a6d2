//! Users of the application.
//!
//! This module contains everything related to users:
//! - The `User` model and the payloads for creating and updating users
//! - Database functions for storing and querying users
//! - Route handlers for the reference store server

mod core;
mod endpoints;

pub use core::{NewUser, User, UserId, UserPatch, create_user_table};
pub use endpoints::{create_user_endpoint, list_users_endpoint, update_user_endpoint};
