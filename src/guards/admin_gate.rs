use std::collections::HashSet;

/// The only runtime environment in which the allow-list is enforced.
pub const PRODUCTION_ENVIRONMENT: &str = "production";

/// parse_admin_allow_list
///
/// Splits a comma-separated list of user IDs, trimming whitespace and dropping empty
/// entries. An absent list parses to the empty set.
pub fn parse_admin_allow_list(raw: Option<&str>) -> HashSet<&str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect()
}

/// can_use_privileged_endpoint
///
/// Outside production every caller is allowed (local development and test runs).
/// In production the caller must appear in the admin allow-list; a missing or empty list
/// denies everyone. A blank `user_id` can never match, since blank entries are dropped.
pub fn can_use_privileged_endpoint(
    user_id: &str,
    runtime_environment: &str,
    admin_id_allow_list_raw: Option<&str>,
) -> bool {
    if runtime_environment != PRODUCTION_ENVIRONMENT {
        return true;
    }
    parse_admin_allow_list(admin_id_allow_list_raw).contains(user_id)
}
