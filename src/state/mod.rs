//! State module for tracking scrape progress
//!
//! This module provides the per-category state carried between pages and runs.
//!
//! # Components
//!
//! - `SeenUrlSet`: article URLs already dispatched for a category
//! - `PaginationCursor`: last listing page whose articles were persisted

mod cursor;
mod seen_urls;

pub use cursor::PaginationCursor;
pub use seen_urls::SeenUrlSet;
