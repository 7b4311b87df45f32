//! Path string helpers shared by the mapper, the walker and the CLI.
//!
//! Document paths are always handled as `/`-separated strings relative to
//! the source root, so these work on `&str` rather than `Path`.

/// Removes `.` and empty segments from a `/`-separated path.
///
/// # Examples
///
/// ```
/// use treeloc::utils::normalize_path;
///
/// assert_eq!(normalize_path("./res/values/strings.json"), "res/values/strings.json");
/// assert_eq!(normalize_path("res//./de/strings.json"), "res/de/strings.json");
/// assert_eq!(normalize_path("/abs/./x"), "/abs/x");
/// assert_eq!(normalize_path("./"), ".");
/// ```
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let joined = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Directory part of a path, `.` when there is none.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(pos) => &path[..pos],
        None => ".",
    }
}

/// Last segment of a path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Text after the last dot of the file name, empty when there is no dot.
///
/// # Examples
///
/// ```
/// use treeloc::utils::extension;
///
/// assert_eq!(extension("a/b/strings.en.json"), "json");
/// assert_eq!(extension("a/b/Makefile"), "");
/// ```
pub fn extension(path: &str) -> &str {
    let name = basename(path);
    name.rfind('.').map(|pos| &name[pos + 1..]).unwrap_or("")
}

/// File name up to its last dot.
pub fn stem(path: &str) -> &str {
    let name = basename(path);
    name.rfind('.').map(|pos| &name[..pos]).unwrap_or(name)
}

/// File name up to its first dot, e.g. `strings` for `strings.en.json`.
pub fn base_name(path: &str) -> &str {
    let name = basename(path);
    name.split('.').next().unwrap_or(name)
}

/// Replace the extension of `path` with `to` when it is one of `from`.
pub fn replace_extension(path: &str, from: &[&str], to: &str) -> Option<String> {
    let ext = extension(path);
    if ext.is_empty() || !from.contains(&ext) {
        return None;
    }
    Some(format!("{}{}", &path[..path.len() - ext.len()], to))
}
