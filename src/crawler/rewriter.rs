//! Rewriting of references to their mirrored copies

use crate::crawler::extractor::{Handling, Reference};
use crate::url::{relative_path, PathMapper, ScopeFilter};
use url::Url;

/// Rewrites document references into links between mirrored files
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'a> {
    mapper: &'a PathMapper,
    scope: &'a ScopeFilter,
}

impl<'a> Rewriter<'a> {
    pub fn new(mapper: &'a PathMapper, scope: &'a ScopeFilter) -> Self {
        Self { mapper, scope }
    }

    /// Local link replacing `reference` in the document stored for `document`
    ///
    /// Returns None when the reference keeps its original text: it is out of
    /// scope, rejected, never stored (ignored or an excluded page), or its
    /// target has no valid mapped path.
    pub fn local_link(&self, document: &Url, reference: &Reference) -> Option<String> {
        let target = &reference.resolved;

        match reference.handling() {
            Handling::Ignore => return None,
            Handling::Page => {
                let relative = relative_path(target).ok()?;
                if self.scope.is_excluded_path(&relative) {
                    return None;
                }
            }
            Handling::Stylesheet | Handling::Script | Handling::Leaf => {}
        }

        if !self.scope.allows(target) {
            return None;
        }

        // Validates the on-disk form as well as the link form
        self.mapper.local_path(target).ok()?;

        let mut link = self.mapper.link_between(document, target).ok()?;
        if let Some((_, fragment)) = reference.literal.split_once('#') {
            link.push('#');
            link.push_str(fragment);
        }
        Some(link)
    }

    /// Copy of `body` with every rewritable reference replaced
    ///
    /// `references` must come from scanning `body` (sorted, non-overlapping
    /// spans). Bytes outside the replaced spans are copied unchanged, whatever
    /// the document's encoding.
    pub fn rewrite(&self, body: &[u8], document: &Url, references: &[Reference]) -> Vec<u8> {
        let mut out = Vec::with_capacity(body.len());
        let mut cursor = 0;

        for reference in references {
            let span = &reference.span;
            if span.start < cursor || span.end > body.len() {
                continue;
            }

            if let Some(link) = self.local_link(document, reference) {
                tracing::debug!("Rewriting {} -> {}", reference.literal, link);
                out.extend_from_slice(&body[cursor..span.start]);
                out.extend_from_slice(link.as_bytes());
                cursor = span.end;
            }
        }

        out.extend_from_slice(&body[cursor..]);
        out
    }
}
