//! Path utilities
//!
//! Lexical path cleaning and the resolution rules shared by the interpreter
//! and the builtin commands. Nothing here touches the disk.

/// Collapse `.` and `..` segments and duplicate slashes.
///
/// `..` never climbs above the root of an absolute path; relative paths keep
/// leading `..` segments. An empty result is `.`.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().map_or(false, |p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Join two path fragments and clean the result.
pub fn join_path(base: &str, rest: &str) -> String {
    clean_path(&format!("{}/{}", base, rest))
}

/// Resolve a user-supplied path against the working directory.
///
/// - `""` is the working directory
/// - `~` is home, and `~/rest` is under home
/// - absolute paths are cleaned
/// - anything else is joined onto the working directory
///
/// When home is unknown, `~` falls back to the working directory and `~/rest`
/// is treated as relative.
pub fn resolve_path(cwd: &str, home: Option<&str>, path: &str) -> String {
    if path.is_empty() {
        return cwd.to_string();
    }

    if path == "~" {
        return home.unwrap_or(cwd).to_string();
    }

    if let Some(rest) = path.strip_prefix("~/") {
        return match home {
            Some(home) => join_path(home, rest),
            None => join_path(cwd, path),
        };
    }

    if path.starts_with('/') {
        return clean_path(path);
    }

    join_path(cwd, path)
}

/// Parent directory of an absolute path; `/` is its own parent.
pub fn dirname(path: &str) -> String {
    let cleaned = clean_path(path);
    match cleaned.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => cleaned[..pos].to_string(),
    }
}
