//! Home-directory shorthand handling for stored and configured paths.

use std::path::{Path, PathBuf};

const HOME_PREFIXES: [&str; 3] = ["~", "$home", "$HOME"];

/// Replaces a leading `~`, `$home` or `$HOME` with the user's home directory.
///
/// Returns the input unchanged when it has no such prefix or when the home
/// directory cannot be resolved.
pub fn expand(path: &str) -> String {
    expand_with_home(path, dirs::home_dir().as_deref())
}

/// Replaces a leading home directory with `~`. Only whole path components
/// match, so `/home/devx` is left alone when home is `/home/dev`.
pub fn collapse(path: &str) -> String {
    collapse_with_home(path, dirs::home_dir().as_deref())
}

/// Expands `path` and anchors a relative result at the working directory.
///
/// The result is not canonicalized, so missing paths are fine. If the working
/// directory cannot be read the expanded path is returned as is.
pub fn absolute(path: &str) -> PathBuf {
    let expanded = PathBuf::from(expand(path));
    std::path::absolute(&expanded).unwrap_or_else(|err| {
        log::warn!("cannot make {} absolute: {}", expanded.display(), err);
        expanded
    })
}

fn expand_with_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home.and_then(Path::to_str) else {
        return path.to_string();
    };

    for prefix in HOME_PREFIXES {
        if let Some(rest) = path.strip_prefix(prefix) {
            return format!("{}{}", home, rest);
        }
    }
    path.to_string()
}

fn collapse_with_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home.and_then(Path::to_str) else {
        return path.to_string();
    };
    if home.is_empty() {
        return path.to_string();
    }

    match path.strip_prefix(home) {
        Some(rest) if rest.is_empty() || rest.starts_with(std::path::is_separator) => {
            format!("~{}", rest)
        }
        _ => path.to_string(),
    }
}
