//! Listing page extraction.
//!
//! The torrents table alternates a data row with one or more detail rows.
//! How many rows to skip is a property of the page layout
//! ([`ListingLayout`]), not of the parser.

mod parser;
mod types;

pub use parser::{parse_count, parse_listing, size_to_gb};
pub use types::*;
