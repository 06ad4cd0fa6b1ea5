/// Page state definitions for tracking mirror progress
///
/// This module defines all possible states a URL can be in while a mirror runs.
use std::fmt;

/// Represents the current state of a URL in the mirror process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// URL has been claimed in the visited set but its fetch has not started
    Claimed,

    /// URL is currently being fetched
    Fetching,

    // ===== Terminal Success States =====
    /// Body was written to its mapped file
    Written,

    // ===== Terminal Skip States =====
    /// Page falls under an excluded path; it is neither fetched nor stored
    Excluded,

    /// Response was not a document of the expected kind (e.g. a page that is not HTML)
    ContentMismatch,

    // ===== Terminal Error States =====
    /// Server answered with a non-2xx status
    BadStatus,

    /// URL could not be reached (timeout, connection refused, DNS failure)
    Unreachable,

    /// Fetch or write failed for other reasons (decode, mapping, I/O)
    Failed,
}

impl PageState {
    /// Returns true if the URL was deliberately not stored
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Excluded | Self::ContentMismatch)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::BadStatus | Self::Unreachable | Self::Failed)
    }

    /// Short lowercase label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::Fetching => "fetching",
            Self::Written => "written",
            Self::Excluded => "excluded",
            Self::ContentMismatch => "content_mismatch",
            Self::BadStatus => "bad_status",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
