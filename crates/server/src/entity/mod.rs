//! SeaORM entities for the identity, configuration and operational stores.

pub mod api_resource;
pub mod api_scope;
pub mod client;
pub mod device_code;
pub mod identity_resource;
pub mod persisted_grant;
pub mod role;

/// Split a space-separated column into its values.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(String::from).collect()
}

/// Parse a JSON array column, treating malformed content as empty.
pub(crate) fn json_list(value: &str) -> Vec<String> {
    serde_json::from_str(value).unwrap_or_default()
}
