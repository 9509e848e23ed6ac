//! Output formatters for listings
//!
//! Provides plain, table and JSON output formats.

use crate::models::Listing;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Table,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "names" => Some(OutputFormat::Plain),
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }
}

/// Listing formatter
pub struct ListingFormatter {
    format: OutputFormat,
}

impl ListingFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a listing; JSON output always holds the full listing
    pub fn format(&self, listing: &Listing) -> anyhow::Result<String> {
        let output = match self.format {
            OutputFormat::Plain => listing.names.join("\n"),
            OutputFormat::Table => self.format_table(listing),
            OutputFormat::Json => serde_json::to_string(listing)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(listing)?,
        };
        Ok(output)
    }

    fn format_table(&self, listing: &Listing) -> String {
        let width = listing
            .names
            .iter()
            .map(|n| n.len())
            .max()
            .unwrap_or(0)
            .max("NAME".len());

        let mut output = format!(
            "{} in namespace {} ({} found)\n",
            listing.resource,
            listing.namespace,
            listing.len()
        );
        output.push_str(&format!("{:width$}\n", "NAME", width = width));
        output.push_str(&format!("{:-<width$}\n", "", width = width));
        for name in &listing.names {
            output.push_str(&format!("{:width$}\n", name, width = width));
        }

        output.trim_end().to_string()
    }
}

impl Default for ListingFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Plain)
    }
}
