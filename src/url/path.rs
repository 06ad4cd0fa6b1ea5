//! Mapping of URLs onto files under the mirror root
//!
//! Every stored file's location is a pure function of its URL. Each path
//! segment is decoded into the file name created on disk, and the file name is
//! percent-encoded again for use in rewritten links, so that a browser
//! following a link lands on the file.
//!
//! File names are escaped so that distinct URLs never share a file: a `%` or
//! `@` taken from the URL path is stored as `%25` or `%40`, which leaves a bare
//! `@` free to mark a folded query string (`search@q=x.html`) or the directory
//! of another in-scope host (`@cdn.example.com/logo.png`).

use crate::url::domain::extract_domain;
use crate::PathError;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Characters of a file name that are written into links unencoded
const LINK_SAFE: &str = "-._~!$&()*+,;=:@";

/// Maps URLs to paths under a mirror root directory
#[derive(Debug, Clone)]
pub struct PathMapper {
    root: PathBuf,
    seed_host: String,
}

impl PathMapper {
    /// Creates a mapper for the given mirror root (e.g. `./example.com`)
    ///
    /// URLs on `seed_host` map directly under the root; URLs on any other host
    /// map under an `@<host>` directory.
    pub fn new(root: impl Into<PathBuf>, seed_host: &str) -> Self {
        Self {
            root: root.into(),
            seed_host: seed_host.to_lowercase(),
        }
    }

    /// The mirror root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative posix path (always `./`-prefixed) of the file stored for `url`
    pub fn relative_path(&self, url: &Url) -> Result<String, PathError> {
        let path = relative_path(url)?;

        match extract_domain(url) {
            Some(host) if host != self.seed_host => Ok(format!(
                "./{}/{}",
                encode_link_segment(&format!("@{}", host)),
                path.trim_start_matches("./")
            )),
            _ => Ok(path),
        }
    }

    /// Location on disk of the file representing `url`
    ///
    /// Segments of the relative path are percent-decoded; a decoded segment
    /// that is not a plain file name (`..`, contains a separator or NUL) is
    /// rejected so that nothing is ever written outside the root.
    pub fn local_path(&self, url: &Url) -> Result<PathBuf, PathError> {
        let relative = self.relative_path(url)?;
        let mut path = self.root.clone();

        for segment in relative.trim_start_matches("./").split('/') {
            let decoded = urlencoding::decode(segment)
                .map_err(|_| PathError::InvalidSegment(segment.to_string()))?;

            if decoded.is_empty()
                || decoded == "."
                || decoded == ".."
                || decoded.contains(|c| matches!(c, '/' | '\\' | '\0'))
            {
                return Err(PathError::InvalidSegment(segment.to_string()));
            }

            path.push(decoded.as_ref());
        }

        Ok(path)
    }

    /// Link from the document stored for `from` to the file stored for `to`
    ///
    /// The result is relative to the directory of `from`'s mapped file, so it
    /// keeps working wherever the mirror tree is moved. It is prefixed with
    /// `./` unless it climbs with `../`.
    pub fn link_between(&self, from: &Url, to: &Url) -> Result<String, PathError> {
        let from_path = self.relative_path(from)?;
        let to_path = self.relative_path(to)?;

        let from_dir = Path::new(from_path.trim_start_matches("./"))
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let target = Path::new(to_path.trim_start_matches("./"));

        let diff = pathdiff::diff_paths(target, &from_dir)
            .ok_or_else(|| PathError::InvalidSegment(to_path.clone()))?;

        let link = diff
            .components()
            .map(|c| match c {
                Component::ParentDir => "..".to_string(),
                other => other.as_os_str().to_string_lossy().into_owned(),
            })
            .collect::<Vec<_>>()
            .join("/");

        if link.starts_with("../") {
            Ok(link)
        } else {
            Ok(format!("./{}", link))
        }
    }
}

/// Computes the `./`-prefixed relative path for a URL, ignoring its host
///
/// # Mapping Rules
///
/// 1. Empty path is treated as `/`
/// 2. A path ending in `/` gets `index.html` appended
/// 3. A last segment without a file extension gets `.html` appended
/// 4. `.`/`..` and empty segments are collapsed; `..` never climbs above the root
/// 5. Each segment is decoded, then `%` and `@` are escaped as `%25` and `%40`
/// 6. A non-empty query is folded into the file name as `@<query>`, in front
///    of the extension, with `%`, `/` and `\` escaped
/// 7. The resulting file names are percent-encoded for use as a link
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wmirror::url::relative_path;
///
/// let url = Url::parse("http://example.com/").unwrap();
/// assert_eq!(relative_path(&url).unwrap(), "./index.html");
///
/// let url = Url::parse("http://example.com/about").unwrap();
/// assert_eq!(relative_path(&url).unwrap(), "./about.html");
///
/// let url = Url::parse("http://example.com/search?q=x").unwrap();
/// assert_eq!(relative_path(&url).unwrap(), "./search@q=x.html");
/// ```
pub fn relative_path(url: &Url) -> Result<String, PathError> {
    if url.cannot_be_a_base() {
        return Err(PathError::Parse(url.to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(PathError::MissingHost(url.to_string()));
    }

    let mut path = url.path().to_string();
    if path.is_empty() {
        path.push('/');
    }

    if path.ends_with('/') {
        path.push_str("index.html");
    } else if !has_extension(last_segment(&path)) {
        path.push_str(".html");
    }

    let mut names = normalize_segments(&path)
        .iter()
        .map(|segment| file_name(segment))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        let file = names
            .pop()
            .ok_or_else(|| PathError::InvalidSegment(url.to_string()))?;
        names.push(fold_query(&file, query));
    }

    if names.is_empty() {
        return Err(PathError::InvalidSegment(url.to_string()));
    }

    let encoded: Vec<String> = names.iter().map(|n| encode_link_segment(n)).collect();
    Ok(format!("./{}", encoded.join("/")))
}

/// Lowercased file extension of the last path segment of `url`, if any
pub fn url_extension(url: &Url) -> Option<String> {
    let segment = last_segment(url.path());
    segment
        .rfind('.')
        .map(|i| segment[i + 1..].to_ascii_lowercase())
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

fn has_extension(segment: &str) -> bool {
    segment.contains('.')
}

/// Collapses `.`, `..` and empty segments
fn normalize_segments(path: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment.to_string()),
        }
    }

    segments
}

/// File name stored for one percent-encoded path segment
fn file_name(segment: &str) -> Result<String, PathError> {
    let decoded = urlencoding::decode(segment)
        .map_err(|_| PathError::InvalidSegment(segment.to_string()))?;
    Ok(decoded.replace('%', "%25").replace('@', "%40"))
}

/// Inserts `@<query>` in front of the extension of `file`
fn fold_query(file: &str, query: &str) -> String {
    let query = query
        .replace('%', "%25")
        .replace('/', "%2F")
        .replace('\\', "%5C");

    match file.rfind('.').filter(|&i| i > 0) {
        Some(i) => format!("{}@{}{}", &file[..i], query, &file[i..]),
        None => format!("{}@{}", file, query),
    }
}

/// Percent-encodes a file name for use as one segment of a link
fn encode_link_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut buf = [0u8; 4];

    for c in name.chars() {
        if c.is_ascii_alphanumeric() || LINK_SAFE.contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }

    out
}
