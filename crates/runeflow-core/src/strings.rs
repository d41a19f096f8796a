//! String helpers shared by every plugin.
//!
//! Image names, default tags and project names all pass through
//! [`normalize`] before they reach an external command line.

/// Turns arbitrary text into an image-name-safe token.
///
/// ASCII letters are lower-cased, every character outside `[a-z0-9_-]`
/// becomes `-`, runs of `-` collapse into one and leading/trailing `-` are
/// trimmed. Text without a single `[A-Za-z0-9_]` character yields an empty
/// string, which [`is_normalized`] rejects.
///
/// # Examples
/// - `validUser/validRepoName` -> `validuser-validreponame`
/// - `work/My Branch!` -> `work-my-branch`
pub fn normalize(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        let c = c.to_ascii_lowercase();
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            c
        } else {
            '-'
        };

        if mapped == '-' && (result.is_empty() || result.ends_with('-')) {
            continue;
        }
        result.push(mapped);
    }

    while result.ends_with('-') {
        result.pop();
    }

    result
}

/// Returns `true` iff `text` matches `^[a-z0-9_-]+$`.
pub fn is_normalized(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Quotes a value for `sh -c` when it contains anything beyond a
/// conservative set of safe characters.
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '_' | '.' | '/' | ':' | '=' | '@' | '%' | '+' | ',' | '-')
        });

    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
