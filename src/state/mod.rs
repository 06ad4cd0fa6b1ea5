//! State module for tracking mirror progress
//!
//! # Components
//!
//! - `PageState`: Tracks the state of individual URLs (claimed, fetching, written, etc.)
//! - `CrawlState`: The visited set of a run, with per-URL states and byte counts

mod crawl_state;
mod page_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_state::PageState;
