//! Output formatters for the duplicate group table.
//!
//! - [`text`]: terminal listing, optionally colored
//! - [`json`]: JSON for scripting
//! - [`csv`]: CSV for spreadsheets, one row per member

pub mod csv;
pub mod json;
pub mod text;

pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
