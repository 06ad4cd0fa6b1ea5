//! URL handling module for wmirror
//!
//! This module provides URL normalization and reference resolution, domain
//! scoping, and the mapping of URLs onto files under the mirror root.

mod domain;
mod normalize;
mod path;
mod scope;

// Re-export main functions
pub use domain::{extract_domain, is_same_or_subdomain, mirror_root_name};
pub use normalize::{is_special_reference, normalize, normalize_url, resolve_reference};
pub use path::{relative_path, url_extension, PathMapper};
pub use scope::ScopeFilter;
