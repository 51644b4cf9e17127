//! Filesystem locations for session state and logs.
//!
//! Session files live in the per-user runtime directory when there is one
//! (`$XDG_RUNTIME_DIR`, cleared at logout/reboot), which gives them the same
//! lifetime as a browser session store. Elsewhere the system temp directory is
//! used.

use std::path::{Path, PathBuf};

/// Environment variable naming the session explicitly.
pub const SESSION_ENV: &str = "SHOPPING_SESSION";

/// Returns the directory holding session files and logs.
///
/// # Examples
///
/// ```
/// use shopping_session::infrastructure::get_data_dir;
///
/// assert!(get_data_dir().ends_with("shopping-session"));
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .filter(|dir| !dir.is_empty())
        .map_or_else(std::env::temp_dir, PathBuf::from)
        .join("shopping-session")
}

/// Identifier of the current session.
///
/// Taken from `SHOPPING_SESSION` if set; otherwise the parent process id, so
/// that every command run from the same shell shares one session.
#[must_use]
pub fn default_session_id() -> String {
    if let Some(id) = std::env::var(SESSION_ENV)
        .ok()
        .filter(|id| !id.trim().is_empty())
    {
        return id;
    }

    #[cfg(unix)]
    {
        format!("ppid-{}", std::os::unix::process::parent_id())
    }
    #[cfg(not(unix))]
    {
        "default".to_string()
    }
}

/// Path of the state file for `session_id` inside `dir`.
///
/// Characters outside `[A-Za-z0-9_-]` are replaced so the id can never escape
/// the directory.
///
/// # Examples
///
/// ```
/// use shopping_session::infrastructure::session_file;
/// use std::path::Path;
///
/// let path = session_file(Path::new("/run/user/1000/shopping-session"), "../evil");
/// assert_eq!(path, Path::new("/run/user/1000/shopping-session/session-___evil.json"));
/// ```
#[must_use]
pub fn session_file(dir: &Path, session_id: &str) -> PathBuf {
    let safe: String = session_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    dir.join(format!("session-{safe}.json"))
}

/// Expands a leading `~` to the user's home directory.
///
/// # Examples
///
/// ```
/// use shopping_session::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), "/absolute/path");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    let Some(home) = std::env::var_os("HOME").and_then(|h| h.into_string().ok()) else {
        return path.to_string();
    };

    if let Some(rest) = path.strip_prefix("~/") {
        format!("{}/{rest}", home.trim_end_matches('/'))
    } else if path == "~" {
        home
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_file_keeps_safe_ids() {
        let path = session_file(Path::new("/tmp/s"), "abc-123_x");
        assert_eq!(path, Path::new("/tmp/s/session-abc-123_x.json"));
    }

    #[test]
    fn session_file_neutralizes_separators() {
        let path = session_file(Path::new("/tmp/s"), "a/b\\c");
        assert_eq!(path.parent(), Some(Path::new("/tmp/s")));
    }
}
