//! Authenticated page and file retrieval.
//!
//! A `PageFetcher` shares its HTTP client (and therefore the cookie jar)
//! with the session manager that created it.

mod page;
mod types;

pub use page::PageFetcher;
pub use types::*;
