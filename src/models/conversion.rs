//! Batch conversion data types.
//!
//! This module defines:
//! - `InputUnit`: one named text unit collected from the request
//! - `ConvertedUnit` / `ConversionFailure`: per-item outcomes
//! - `ConversionResponse`: the buffered JSON response body

use serde::Serialize;

/// Origin label for the manual free-text block.
pub const MANUAL_INPUT_NAME: &str = "manual_input";

/// One named text unit going into a batch.
///
/// Units are positionally distinct: duplicate filenames are preserved as
/// separate units, never deduplicated. The manual text block (if
/// non-blank) becomes one synthetic unit processed before the files.
#[derive(Debug, Clone)]
pub struct InputUnit {
    /// Output name stem; renderers append `.txt` or `.xml`
    pub name: String,

    /// Identifier used in error messages (original filename, or
    /// `manual_input` for the manual block)
    pub label: String,

    /// Origin tag: the uploaded filename, or `manual`
    pub source: String,

    /// Raw TAC text
    pub text: String,
}

impl InputUnit {
    /// Unit built from the manual free-text form field.
    pub fn manual(text: String) -> Self {
        Self {
            name: MANUAL_INPUT_NAME.to_string(),
            label: MANUAL_INPUT_NAME.to_string(),
            source: "manual".to_string(),
            text,
        }
    }

    /// Unit built from an uploaded file. `filename` is the name the
    /// client supplied; the output stem is its basename without
    /// extension, which also strips any path components.
    pub fn from_file(filename: &str, text: String) -> Self {
        let stem = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .unwrap_or("unknown");
        Self {
            name: stem.to_string(),
            label: filename.to_string(),
            source: filename.to_string(),
            text,
        }
    }
}

/// A successful per-item conversion, before a renderer names it.
#[derive(Debug, Clone)]
pub struct ConvertedUnit {
    /// Output name stem (no extension yet)
    pub name: String,

    /// IWXXM XML document text
    pub content: String,

    /// Origin tag carried over from the input unit
    pub source: String,

    /// Byte length of the UTF-8 encoded output
    pub size_bytes: usize,
}

/// A failed per-item conversion.
///
/// Failures are data, not process errors: they ride alongside successes
/// in the batch response.
#[derive(Debug, Clone)]
pub struct ConversionFailure {
    /// Input identifier (filename or `manual_input`)
    pub label: String,

    /// Human-readable reason from the engine or the orchestrator
    pub message: String,
}

impl std::fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

/// One entry in the buffered JSON response.
///
/// ```json
/// {
///   "name": "KJFK_231751Z.txt",
///   "content": "<?xml version=\"1.0\" ...",
///   "source": "KJFK_231751Z.txt",
///   "size_bytes": 1452
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ConversionResult {
    pub name: String,
    pub content: String,
    pub source: String,
    pub size_bytes: usize,
}

/// Response body for `POST /api/convert`.
///
/// Invariant: `total_processed == successful + failed`, and both lists
/// preserve input order.
#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub results: Vec<ConversionResult>,
    pub errors: Vec<String>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_unit_uses_basename_stem() {
        let unit = InputUnit::from_file("KJFK_231751Z.txt", "METAR ...".into());
        assert_eq!(unit.name, "KJFK_231751Z");
        assert_eq!(unit.label, "KJFK_231751Z.txt");
    }

    #[test]
    fn path_components_are_stripped_from_stems() {
        let unit = InputUnit::from_file("../../etc/passwd.txt", "x".into());
        assert_eq!(unit.name, "passwd");
    }

    #[test]
    fn unnamed_file_falls_back_to_unknown() {
        let unit = InputUnit::from_file("", "x".into());
        assert_eq!(unit.name, "unknown");
    }

    #[test]
    fn failure_display_prefixes_the_label() {
        let failure = ConversionFailure {
            label: "bad.txt".into(),
            message: "decoding error: invalid station identifier 'xx'".into(),
        };
        assert_eq!(
            failure.to_string(),
            "bad.txt: decoding error: invalid station identifier 'xx'"
        );
    }
}
