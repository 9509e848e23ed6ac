//! Output formatting module
//!
//! Renders listings for the terminal or for scripts.

mod formatter;

pub use formatter::{ListingFormatter, OutputFormat};
