//! Credential sourcing: explicit value first, settings snapshot second.

use crate::error::CredentialsError;

/// Picks the explicit value, else the fallback; blank values count as absent.
pub fn require_credential(
    explicit: Option<&str>,
    fallback: Option<&str>,
    what: &'static str,
    env: &'static str,
) -> Result<String, CredentialsError> {
    explicit
        .filter(|v| !v.trim().is_empty())
        .or(fallback.filter(|v| !v.trim().is_empty()))
        .map(str::to_string)
        .ok_or(CredentialsError::Missing { what, env })
}
