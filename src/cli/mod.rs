//! CLI command implementations.
//!
//! Each submodule implements one subcommand of the `gpumatch` binary. Commands
//! return serializable values; the binary renders them with [`render`].
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `resolve` | Resolve titles to canonical model ids |
//! | `dedup` | Cluster a batch of listings into duplicate groups |
//! | `process` | Resolve and cluster a batch in one pass |
//! | `registry` | List canonical ids with aliases and detection patterns |
//!
//! # Example Usage
//!
//! ```bash
//! gpumatch resolve "NVIDIA RTX A6000 48GB" "tesla t4"
//! gpumatch dedup --input listings.json
//! cat listings.json | gpumatch process --input - --format pretty
//! ```

mod dedup;
mod process;
mod registry;
mod resolve;

pub use dedup::{DedupCommand, IndexedAssignment};
pub use process::{ProcessCommand, ProcessOutput};
pub use registry::{RegistryCommand, RegistryEntry};
pub use resolve::{ResolveCommand, ResolvedTitle};

use crate::models::ListingRecord;
use crate::{Error, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Input path meaning standard input.
pub const STDIN_INPUT: &str = "-";

/// Output rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Compact JSON on one line.
    #[default]
    Json,
    /// Indented JSON.
    Pretty,
}

impl OutputFormat {
    /// Parses a format name, falling back to [`OutputFormat::Json`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Json,
        }
    }
}

/// Renders a command result.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
    };
    rendered.map_err(|e| Error::OperationFailed {
        operation: "render_output".to_string(),
        cause: e.to_string(),
    })
}

/// Parses a JSON array of listing records.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the text is not an array of records.
pub fn parse_listings(text: &str) -> Result<Vec<ListingRecord>> {
    serde_json::from_str(text)
        .map_err(|e| Error::InvalidInput(format!("expected a JSON array of listings: {e}")))
}

/// Reads listing records from a file, or from stdin when `input` is `-`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed.
pub fn read_listings(input: &str) -> Result<Vec<ListingRecord>> {
    let text = if input == STDIN_INPUT {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| Error::OperationFailed {
                operation: "read_stdin".to_string(),
                cause: e.to_string(),
            })?;
        buf
    } else {
        std::fs::read_to_string(Path::new(input)).map_err(|e| Error::OperationFailed {
            operation: "read_listings".to_string(),
            cause: format!("{input}: {e}"),
        })?
    };
    let listings = parse_listings(&text)?;
    tracing::debug!(count = listings.len(), input, "Listings read");
    Ok(listings)
}
