/// Database settings, connection pool and table creation
pub mod database;

/// HTTP server settings from environment variables
pub mod server;

/// Reference-data catalog loaded from a TOML file
pub mod catalog;

/// Reads a variable through `lookup`, falling back to `default` when unset or blank.
pub(crate) fn var_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Like [`var_or`] but parses the value, reporting unparsable input as a config error.
pub(crate) fn parsed_var_or<F, T>(lookup: &F, key: &str, default: T) -> crate::errors::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key).map(|value| value.trim().to_string()) {
        Some(raw) if !raw.is_empty() => raw.parse().map_err(|_| crate::errors::Error::Config {
            message: format!("{key} must be a valid number, got {raw:?}"),
        }),
        _ => Ok(default),
    }
}
