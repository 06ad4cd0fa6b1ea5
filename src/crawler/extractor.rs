//! Pattern-based reference extraction
//!
//! Documents are scanned with regular expressions rather than parsed, so
//! malformed markup may yield imprecise results. Every reference carries the
//! byte span of its literal in the scanned body so that the rewriter can
//! splice in a replacement without re-scanning or re-encoding the document.

use crate::url::{resolve_reference, url_extension};
use crate::MirrorError;
use regex::bytes::{Captures, Regex};
use std::ops::Range;
use url::Url;

/// Image extensions recognised in script string literals
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp"];

/// Path segments that mark a script string literal as an image path
const IMAGE_DIRECTORIES: &[&str] = &["/images/", "/img/"];

/// Kind of document being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Css,
    Js,
}

impl DocumentKind {
    /// Kind of a stylesheet or script URL, judged by its extension
    pub fn from_url(url: &Url) -> Option<Self> {
        match url_extension(url).as_deref() {
            Some("css") => Some(Self::Css),
            Some("js") => Some(Self::Js),
            Some("html") | Some("htm") => Some(Self::Html),
            _ => None,
        }
    }
}

/// Where a reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Anchor,
    Link,
    Image,
    Script,
    CssUrl,
    ScriptLiteral,
}

/// What the mirror does with a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// Another page: queued for the walk
    Page,
    /// A stylesheet: downloaded and scanned for images
    Stylesheet,
    /// A script: downloaded and scanned for images
    Script,
    /// Downloaded as is
    Leaf,
    /// Neither followed nor downloaded
    Ignore,
}

/// An embedded reference found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub source: Source,
    /// The literal as it appears in the document
    pub literal: String,
    /// Byte span of the literal in the document
    pub span: Range<usize>,
    /// Absolute, normalized target
    pub resolved: Url,
}

impl Reference {
    pub fn handling(&self) -> Handling {
        let extension = url_extension(&self.resolved);

        match self.source {
            Source::Anchor => match extension.as_deref() {
                None | Some("html") | Some("htm") => Handling::Page,
                Some(_) => Handling::Ignore,
            },
            Source::Link => match extension.as_deref() {
                Some("css") => Handling::Stylesheet,
                Some(_) => Handling::Leaf,
                None => Handling::Ignore,
            },
            Source::Script => match extension.as_deref() {
                Some("js") => Handling::Script,
                _ => Handling::Ignore,
            },
            Source::Image | Source::CssUrl | Source::ScriptLiteral => Handling::Leaf,
        }
    }
}

/// Compiled extraction patterns
///
/// The patterns run on raw bytes with Unicode matching disabled, so documents
/// in any ASCII-compatible encoding are scanned without being decoded first.
#[derive(Debug, Clone)]
pub struct Extractor {
    tag_attr: Regex,
    style_block: Regex,
    script_block: Regex,
    css_url: Regex,
    js_literal: Regex,
}

impl Extractor {
    /// Compiles the extraction patterns
    pub fn new() -> Result<Self, MirrorError> {
        Ok(Self {
            tag_attr: Regex::new(
                r#"(?i-u)<(a|link|img|script)\b[^>]*?\s(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
            )?,
            style_block: Regex::new(r"(?is-u)<style\b[^>]*>(.*?)</style\s*>")?,
            script_block: Regex::new(r"(?is-u)<script\b[^>]*>(.*?)</script\s*>")?,
            css_url: Regex::new(
                r#"(?i-u)url\(\s*(?:"([^"]*)"|'([^']*)'|([^'"()\s]+))\s*\)"#,
            )?,
            js_literal: Regex::new(r#"(?-u)"([^"\\\r\n]*)"|'([^'\\\r\n]*)'"#)?,
        })
    }

    /// Extracts the references of a document in document order
    ///
    /// References are resolved against `base`; special references
    /// (fragment-only, `javascript:`, `data:`, `mailto:`, `tel:`), literals
    /// that are not valid UTF-8 and those that do not resolve to an HTTP(S)
    /// URL are dropped. When two matches overlap, the earlier one wins.
    pub fn extract(&self, kind: DocumentKind, body: &[u8], base: &Url) -> Vec<Reference> {
        let mut found = Vec::new();

        match kind {
            DocumentKind::Html => {
                self.scan_tags(body, base, &mut found);
                for block in self.style_block.captures_iter(body) {
                    if let Some(inner) = block.get(1) {
                        self.scan_css(inner.as_bytes(), inner.start(), base, &mut found);
                    }
                }
                for block in self.script_block.captures_iter(body) {
                    if let Some(inner) = block.get(1) {
                        self.scan_js(inner.as_bytes(), inner.start(), base, &mut found);
                    }
                }
            }
            DocumentKind::Css => self.scan_css(body, 0, base, &mut found),
            DocumentKind::Js => self.scan_js(body, 0, base, &mut found),
        }

        drop_overlaps(found)
    }

    fn scan_tags(&self, body: &[u8], base: &Url, out: &mut Vec<Reference>) {
        for caps in self.tag_attr.captures_iter(body) {
            let source = match caps[1].to_ascii_lowercase().as_slice() {
                b"a" => Source::Anchor,
                b"link" => Source::Link,
                b"img" => Source::Image,
                _ => Source::Script,
            };

            let Some((literal, span)) = first_group(&caps, &[2, 3]) else {
                continue;
            };

            let unescaped = literal.replace("&amp;", "&");
            push_resolved(out, source, literal, span, &unescaped, base);
        }
    }

    fn scan_css(&self, body: &[u8], offset: usize, base: &Url, out: &mut Vec<Reference>) {
        for caps in self.css_url.captures_iter(body) {
            let Some((literal, span)) = first_group(&caps, &[1, 2, 3]) else {
                continue;
            };
            let span = offset + span.start..offset + span.end;
            push_resolved(out, Source::CssUrl, literal, span, literal, base);
        }
    }

    fn scan_js(&self, body: &[u8], offset: usize, base: &Url, out: &mut Vec<Reference>) {
        for caps in self.js_literal.captures_iter(body) {
            let Some((literal, span)) = first_group(&caps, &[1, 2]) else {
                continue;
            };
            if !looks_like_image_path(literal) {
                continue;
            }
            let span = offset + span.start..offset + span.end;
            push_resolved(out, Source::ScriptLiteral, literal, span, literal, base);
        }
    }
}

/// First participating group among `groups`, as text with its byte span
///
/// Returns None when no group matched or the literal is not valid UTF-8.
fn first_group<'t>(caps: &Captures<'t>, groups: &[usize]) -> Option<(&'t str, Range<usize>)> {
    let m = groups.iter().find_map(|&i| caps.get(i))?;
    match std::str::from_utf8(m.as_bytes()) {
        Ok(literal) => Some((literal, m.range())),
        Err(_) => {
            tracing::trace!("Dropping non-UTF-8 reference at byte {}", m.start());
            None
        }
    }
}

fn push_resolved(
    out: &mut Vec<Reference>,
    source: Source,
    literal: &str,
    span: Range<usize>,
    target: &str,
    base: &Url,
) {
    match resolve_reference(base, target) {
        Some(resolved) => out.push(Reference {
            source,
            literal: literal.to_string(),
            span,
            resolved,
        }),
        None => tracing::trace!("Dropping reference {:?} in {}", literal, base),
    }
}

/// True for literals such as `"/images/a.png"` or `'logo.svg?v=2'`
fn looks_like_image_path(literal: &str) -> bool {
    if literal.is_empty() || literal.chars().any(char::is_whitespace) {
        return false;
    }

    let lower = literal.to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or("");

    let has_image_extension = path
        .rsplit_once('.')
        .map_or(false, |(_, ext)| IMAGE_EXTENSIONS.contains(&ext));

    has_image_extension
        || IMAGE_DIRECTORIES.iter().any(|dir| {
            lower.contains(dir) || lower.starts_with(dir.trim_start_matches('/'))
        })
}

/// Sorts by position and drops every reference overlapping an earlier one
fn drop_overlaps(mut found: Vec<Reference>) -> Vec<Reference> {
    found.sort_by_key(|r| (r.span.start, r.span.end));

    let mut kept: Vec<Reference> = Vec::with_capacity(found.len());
    for reference in found {
        if kept
            .last()
            .map_or(true, |prev| reference.span.start >= prev.span.end)
        {
            kept.push(reference);
        }
    }
    kept
}
