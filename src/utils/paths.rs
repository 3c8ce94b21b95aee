use std::borrow::Cow;
use std::env;
use std::fmt;
use std::path::Path;

use percent_encoding::percent_decode_str;
use thiserror::Error;

const FILE_SCHEME: &str = "file://";
const SEPARATOR: char = '/';

/// Path computations that fall outside the target directory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("{candidate} is not within {base}")]
    NotContained { candidate: String, base: String },
}

/// A path in canonical form: decoded, home-expanded, `/`-separated, with redundant
/// segments collapsed and no trailing separator (except for a root).
///
/// All containment checks operate on this form, so two references to the same file
/// compare equal regardless of how they were spelled on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub fn new(raw: &str) -> Self {
        Self(normalize_path(raw))
    }

    #[cfg(test)]
    pub(crate) fn with_home(raw: &str, home: Option<&Path>) -> Self {
        Self(normalize_path_internal(raw, home))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path of `self` relative to `base`
    ///
    /// The empty string means `self` is `base`. Matching happens on whole segments:
    /// `/a/bc` is not inside `/a/b`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NotContained`] if `self` does not lie within `base`.
    pub fn relative_to(&self, base: &CanonicalPath) -> Result<&str, PathError> {
        strip_base(&self.0, &base.0).ok_or_else(|| PathError::NotContained {
            candidate: self.0.clone(),
            base: base.0.clone(),
        })
    }

    pub fn is_within(&self, base: &CanonicalPath) -> bool {
        strip_base(&self.0, &base.0).is_some()
    }

    /// Last segment of the path, if any
    pub fn file_name(&self) -> Option<&str> {
        self.0.rsplit(SEPARATOR).next().filter(|name| !name.is_empty() && !name.ends_with(':'))
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips the `file://` scheme from a reference and percent-decodes the rest
///
/// Redundant slashes after the scheme are tolerated (`file:////x` and `file://x`
/// both mean `/x`), and a Windows drive keeps no leading slash (`file:///c%3A/x`
/// decodes to `c:/x`). References without the scheme are returned unchanged.
///
/// # Examples
///
/// ```
/// use cursor_history_restore::decode_file_uri;
///
/// assert_eq!(decode_file_uri("file:///Users/foo/my%20app"), "/Users/foo/my app");
/// assert_eq!(decode_file_uri("/plain/path"), "/plain/path");
/// ```
pub fn decode_file_uri(reference: &str) -> Cow<'_, str> {
    let Some(rest) = reference.strip_prefix(FILE_SCHEME) else {
        return Cow::Borrowed(reference);
    };

    let decoded = percent_decode_str(rest).decode_utf8_lossy();
    let trimmed = decoded.trim_start_matches(SEPARATOR);
    if has_drive_prefix(trimmed) {
        Cow::Owned(trimmed.to_string())
    } else {
        Cow::Owned(format!("/{}", trimmed))
    }
}

/// Normalizes a file reference into its canonical, comparable form
///
/// # Examples
///
/// ```
/// use cursor_history_restore::normalize_path;
///
/// assert_eq!(normalize_path("file:///proj/src/../lib/"), "/proj/lib");
/// assert_eq!(normalize_path("C:\\work\\app\\"), "c:/work/app");
/// assert_eq!(normalize_path("/"), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    normalize_path_internal(path, None)
}

/// Internal helper for normalization with optional home override (for testing)
pub(crate) fn normalize_path_internal(path: &str, home_override: Option<&Path>) -> String {
    let decoded = decode_file_uri(path);
    let expanded = expand_home(&decoded, home_override);
    let unified = expanded.replace('\\', "/");
    collapse_segments(&unified)
}

/// Returns true if `candidate` lies within (or is) the directory `base`
pub fn is_contained(candidate: &str, base: &str) -> bool {
    CanonicalPath::new(candidate).is_within(&CanonicalPath::new(base))
}

/// Computes the `/`-separated path of `candidate` relative to `base`
///
/// # Errors
///
/// Returns [`PathError::NotContained`] when [`is_contained`] would return false.
pub fn relative_of(candidate: &str, base: &str) -> Result<String, PathError> {
    let candidate = CanonicalPath::new(candidate);
    let base = CanonicalPath::new(base);
    candidate.relative_to(&base).map(str::to_string)
}

fn strip_base<'a>(candidate: &'a str, base: &str) -> Option<&'a str> {
    if candidate == base {
        return Some("");
    }

    let rest = candidate.strip_prefix(base)?;
    // Roots (`/`, `c:/`) already end with the separator
    let rest = if base.ends_with(SEPARATOR) { rest } else { rest.strip_prefix(SEPARATOR)? };
    if rest.is_empty() { None } else { Some(rest) }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'/' || bytes[2] == b'\\')
}

fn expand_home<'a>(path: &'a str, home_override: Option<&Path>) -> Cow<'a, str> {
    let is_home_ref = path == "~" || path.starts_with("~/") || path.starts_with("~\\");
    if !is_home_ref {
        return Cow::Borrowed(path);
    }

    let home = home_override.map(Path::to_path_buf).or_else(dirs::home_dir);
    match home {
        Some(home) => Cow::Owned(format!("{}{}", home.to_string_lossy(), &path[1..])),
        None => Cow::Borrowed(path),
    }
}

fn collapse_segments(path: &str) -> String {
    let (root, rest) = if let Some(rest) = path.strip_prefix(SEPARATOR) {
        ("/".to_string(), rest)
    } else if has_drive_prefix(path) {
        // Drive letters compare case-insensitively; `c:` is the canonical spelling
        (format!("{}/", path[..2].to_ascii_lowercase()), path[2..].trim_start_matches(SEPARATOR))
    } else {
        (String::new(), path)
    };
    let absolute = !root.is_empty();

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` cannot climb above a root
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if root.is_empty() && joined.is_empty() {
        return ".".to_string();
    }
    format!("{}{}", root, joined)
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use cursor_history_restore::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/Projects");
/// // Returns "~/Projects" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && CanonicalPath::new(&path_str).is_within(&CanonicalPath::new(home))
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_decode_file_uri_three_slashes() {
        assert_eq!(decode_file_uri("file:///Users/foo/bar.rs"), "/Users/foo/bar.rs");
    }

    #[test]
    fn test_decode_file_uri_percent_encoded() {
        assert_eq!(
            decode_file_uri("file:///Users/foo/my%20project%20%28v1%29/a.py"),
            "/Users/foo/my project (v1)/a.py"
        );
    }

    #[test]
    fn test_decode_file_uri_redundant_slashes() {
        assert_eq!(decode_file_uri("file:////Users/foo"), "/Users/foo");
        assert_eq!(decode_file_uri("file://Users/foo"), "/Users/foo");
    }

    #[test]
    fn test_decode_file_uri_windows_drive() {
        assert_eq!(decode_file_uri("file:///c%3A/Users/foo"), "c:/Users/foo");
    }

    #[test]
    fn test_decode_leaves_plain_paths_alone() {
        // Percent signs in a plain path are literal
        assert_eq!(decode_file_uri("/tmp/100%25"), "/tmp/100%25");
    }

    #[test]
    fn test_normalize_strips_trailing_separator() {
        assert_eq!(normalize_path("/proj/"), "/proj");
        assert_eq!(normalize_path("/proj//"), "/proj");
    }

    #[test]
    fn test_normalize_root_stays_root() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
        assert_eq!(normalize_path("file:///"), "/");
    }

    #[test]
    fn test_normalize_collapses_redundant_segments() {
        assert_eq!(normalize_path("/proj/./src//app.py"), "/proj/src/app.py");
        assert_eq!(normalize_path("/proj/src/../lib/app.py"), "/proj/lib/app.py");
        assert_eq!(normalize_path("/../etc"), "/etc");
    }

    #[test]
    fn test_normalize_relative_paths() {
        assert_eq!(normalize_path("a/../../b"), "../b");
        assert_eq!(normalize_path("./"), ".");
    }

    #[test]
    fn test_normalize_backslashes() {
        assert_eq!(normalize_path("C:\\Users\\foo\\"), "c:/Users/foo");
        assert_eq!(normalize_path("C:\\"), "c:/");
    }

    #[test]
    fn test_drive_letter_case_is_ignored() {
        let recorded = "file:///c%3A/Users/me/proj/src/a.rs";
        assert!(is_contained(recorded, "C:\\Users\\me\\proj"));
        assert_eq!(relative_of(recorded, "C:\\Users\\me\\proj").unwrap(), "src/a.rs");
        assert_eq!(relative_of("D:/data/x", "d:\\data").unwrap(), "x");
        // Only the drive letter is folded
        assert!(!is_contained("c:/users/me/proj/a.rs", "C:\\Users\\me\\proj"));
    }

    #[test]
    fn test_normalize_expands_home() {
        let home = PathBuf::from("/home/alice");
        assert_eq!(
            CanonicalPath::with_home("~/Projects/app/", Some(&home)).as_str(),
            "/home/alice/Projects/app"
        );
        assert_eq!(CanonicalPath::with_home("~", Some(&home)).as_str(), "/home/alice");
        // Only a leading marker is expanded
        assert_eq!(CanonicalPath::with_home("/srv/~/x", Some(&home)).as_str(), "/srv/~/x");
        assert_eq!(CanonicalPath::with_home("~bob/x", Some(&home)).as_str(), "~bob/x");
    }

    #[test]
    fn test_contained_in_itself() {
        assert!(is_contained("/proj", "/proj"));
        assert_eq!(relative_of("/proj", "/proj/").unwrap(), "");
    }

    #[test]
    fn test_contained_nested() {
        assert!(is_contained("/proj/src/app.py", "/proj"));
        assert_eq!(relative_of("file:///proj/src/app.py", "/proj/").unwrap(), "src/app.py");
    }

    #[test]
    fn test_sibling_prefix_is_not_contained() {
        assert!(!is_contained("/a/bc", "/a/b"));
        assert!(!is_contained("/a/bc/file.txt", "/a/b/"));
        assert!(!is_contained("/a", "/a/b"));
    }

    #[test]
    fn test_relative_of_not_contained() {
        let err = relative_of("/other/app.py", "/proj").unwrap_err();
        assert_eq!(
            err,
            PathError::NotContained { candidate: "/other/app.py".into(), base: "/proj".into() }
        );
        assert!(err.to_string().contains("is not within"));
    }

    #[test]
    fn test_everything_is_within_root() {
        assert_eq!(relative_of("/proj/a.txt", "/").unwrap(), "proj/a.txt");
        assert_eq!(relative_of("c:/proj/a.txt", "c:\\").unwrap(), "proj/a.txt");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(CanonicalPath::new("/proj/src/app.py").file_name(), Some("app.py"));
        assert_eq!(CanonicalPath::new("/").file_name(), None);
        assert_eq!(CanonicalPath::new("c:/").file_name(), None);
    }

    #[test]
    fn test_format_path_with_tilde() {
        let path = PathBuf::from("/Users/testuser/Documents/project");
        let formatted = format_path_with_tilde_internal(&path, Some("/Users/testuser"));
        assert_eq!(formatted, "~/Documents/project");

        let path2 = PathBuf::from("/opt/local/bin");
        let formatted2 = format_path_with_tilde_internal(&path2, Some("/Users/testuser"));
        assert_eq!(formatted2, "/opt/local/bin");

        // Sibling directory sharing a string prefix with home
        let path3 = PathBuf::from("/Users/testuser2/notes");
        let formatted3 = format_path_with_tilde_internal(&path3, Some("/Users/testuser"));
        assert_eq!(formatted3, "/Users/testuser2/notes");
    }
}
