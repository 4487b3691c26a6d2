//! The REST resource paths served by the store.
//!
//! For endpoints that take a parameter, e.g., '/users/{user_id}', use [format_endpoint].

/// The route to list and create users.
pub const USERS: &str = "/users";
/// The route to update a single user.
pub const USER: &str = "/users/{user_id}";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transactions";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is the text between a left brace and the next right brace,
/// e.g. '{user_id}' in '/users/{user_id}'. Only the first parameter is
/// replaced, and the path is returned unchanged if it has no parameter.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_end..]
    )
}
