//! Environment variable parsing with warn-level logging for invalid values.

use crate::CoreError;

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Boolean flag accepting `true/false`, `1/0`, `yes/no`, `on/off` in any case.
pub fn env_flag_with_default(var: &str, default: bool) -> bool {
    let Ok(raw) = std::env::var(var) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            tracing::warn!(var, value = %raw, default, "invalid boolean env var, using default");
            default
        },
    }
}

/// Trimmed value of `var`, or `None` when unset or blank.
pub fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Like [`env_string`] but the variable must be present.
///
/// # Errors
/// Returns [`CoreError::MissingEnv`] when the variable is unset or blank.
pub fn env_required(var: &'static str) -> Result<String, CoreError> {
    env_string(var).ok_or(CoreError::MissingEnv(var))
}
