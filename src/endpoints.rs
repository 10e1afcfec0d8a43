//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/expenses/{expense_id}', use [format_endpoint].

/// The route to create and list expenses.
pub const EXPENSES: &str = "/expenses";
/// The route to get, update or delete a single expense.
pub const EXPENSE: &str = "/expenses/{expense_id}";
/// The route for the per-category expense totals.
pub const EXPENSE_SUMMARY: &str = "/expenses/summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let param_start = endpoint_path.find('{');
    let param_end = param_start
        .and_then(|start| endpoint_path[start..].find('}').map(|end| start + end));

    match (param_start, param_end) {
        (Some(start), Some(end))
            if endpoint_path[start + 1..end]
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_') =>
        {
            format!(
                "{}{}{}",
                &endpoint_path[..start],
                id,
                &endpoint_path[end + 1..]
            )
        }
        _ => endpoint_path.to_owned(),
    }
}
