//! Streamed-archive response strategy: render a batch outcome as a ZIP.
//!
//! Each successful conversion becomes one `<name>.xml` entry, written to
//! the archive as it is visited rather than collected first. If any unit
//! failed, a single trailing `errors.txt` entry lists every failure, one
//! per line. `finish` writes the central directory on every path, and the
//! writer finalizes on drop as well, so the archive stays structurally
//! valid.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use zip::{CompressionMethod, write::FileOptions, write::ZipWriter};

use crate::{
    error::AppError,
    models::conversion::{ConversionFailure, ConvertedUnit},
};

/// Deterministic archive name from the request-start timestamp,
/// e.g. `iwxxm_batch_20260830T141503Z.zip`.
pub fn zip_filename(started_at: DateTime<Utc>) -> String {
    format!("iwxxm_batch_{}.zip", started_at.format("%Y%m%dT%H%M%SZ"))
}

/// Build the ZIP archive bytes for a batch outcome.
///
/// Entry count invariant: `results.len()` entries plus one `errors.txt`
/// iff there is at least one failure.
pub fn build_zip(
    results: &[ConvertedUnit],
    failures: &[ConversionFailure],
) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for converted in results {
            zip.start_file(format!("{}.xml", converted.name), options)?;
            zip.write_all(converted.content.as_bytes())?;
        }

        if !failures.is_empty() {
            let joined = failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            zip.start_file("errors.txt", options)?;
            zip.write_all(joined.as_bytes())?;
        }

        zip.finish()?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn converted(name: &str) -> ConvertedUnit {
        let content = format!("<iwxxm:METAR>{name}</iwxxm:METAR>");
        ConvertedUnit {
            name: name.to_string(),
            size_bytes: content.len(),
            content,
            source: format!("{name}.txt"),
        }
    }

    fn failure(label: &str) -> ConversionFailure {
        ConversionFailure {
            label: label.to_string(),
            message: "decoding error: bad group".to_string(),
        }
    }

    fn open(buffer: Vec<u8>) -> zip::ZipArchive<Cursor<Vec<u8>>> {
        zip::ZipArchive::new(Cursor::new(buffer)).unwrap()
    }

    #[test]
    fn one_entry_per_success_no_errors_entry_when_clean() {
        let buffer = build_zip(&[converted("a"), converted("b")], &[]).unwrap();
        let mut archive = open(buffer);
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("a.xml").is_ok());
        assert!(archive.by_name("b.xml").is_ok());
        assert!(archive.by_name("errors.txt").is_err());
    }

    #[test]
    fn failures_collapse_into_one_errors_entry() {
        let buffer = build_zip(&[converted("good")], &[failure("bad1.txt"), failure("bad2.txt")])
            .unwrap();
        let mut archive = open(buffer);
        // successes + exactly one errors entry
        assert_eq!(archive.len(), 2);

        let mut text = String::new();
        archive
            .by_name("errors.txt")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("bad1.txt: "));
        assert!(lines[1].starts_with("bad2.txt: "));
    }

    #[test]
    fn entry_content_round_trips() {
        let buffer = build_zip(&[converted("kjfk")], &[]).unwrap();
        let mut archive = open(buffer);
        let mut text = String::new();
        archive
            .by_name("kjfk.xml")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "<iwxxm:METAR>kjfk</iwxxm:METAR>");
    }

    #[test]
    fn filename_embeds_utc_timestamp() {
        let stamp = DateTime::parse_from_rfc3339("2026-08-30T14:15:03Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(zip_filename(stamp), "iwxxm_batch_20260830T141503Z.zip");
    }
}
