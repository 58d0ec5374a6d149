//! Batch conversion HTTP handlers.
//!
//! Both endpoints share one ingestion path (multipart form with
//! repeatable `files` parts and an optional `manual_text` field) and one
//! orchestrator; they differ only in how the outcome is rendered:
//! - POST /api/convert - buffered JSON with per-item results and errors
//! - POST /api/convert-zip - ZIP archive, one entry per success plus a
//!   trailing errors entry when anything failed

use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use std::time::Duration;

use crate::{
    error::AppError,
    models::conversion::{ConversionResponse, ConversionResult, InputUnit},
    services::{archive_service, batch_service},
    state::AppState,
};

/// Convert a batch and return the buffered JSON response.
///
/// # Response
///
/// - **200 OK**: at least one unit succeeded; failed siblings are listed
///   in `errors` but never force a retry of the whole batch
/// - **400**: no inputs at all, or every unit failed (aggregated
///   `{message, errors, total_errors}` body)
///
/// ```json
/// {
///   "results": [{"name": "KJFK.txt", "content": "<?xml ...", "source": "KJFK.txt", "size_bytes": 1452}],
///   "errors": ["bad.txt: decoding error: unrecognized group 'XYZ'"],
///   "total_processed": 2,
///   "successful": 1,
///   "failed": 1
/// }
/// ```
pub async fn convert(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ConversionResponse>, AppError> {
    let units = collect_units(multipart).await?;
    let outcome = batch_service::run_batch(
        state.engine.clone(),
        units,
        state.config.convert_concurrency,
        Duration::from_secs(state.config.convert_timeout_secs),
    )
    .await?;

    if outcome.all_failed() {
        return Err(AppError::AllFailed {
            message: "All conversions failed".to_string(),
            errors: outcome.error_strings(),
        });
    }

    let results: Vec<ConversionResult> = outcome
        .results
        .iter()
        .map(|converted| ConversionResult {
            name: format!("{}.txt", converted.name),
            content: converted.content.clone(),
            source: converted.source.clone(),
            size_bytes: converted.size_bytes,
        })
        .collect();

    Ok(Json(ConversionResponse {
        total_processed: outcome.total_processed(),
        successful: results.len(),
        failed: outcome.failures.len(),
        errors: outcome.error_strings(),
        results,
    }))
}

/// Convert a batch and return a ZIP archive of the outputs.
///
/// The archive name embeds a UTC timestamp captured at request start:
/// `iwxxm_batch_<YYYYMMDDTHHMMSSZ>.zip`. Total failure yields the same
/// aggregated 400 body as the JSON endpoint.
pub async fn convert_zip(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let started_at = Utc::now();

    let units = collect_units(multipart).await?;
    let outcome = batch_service::run_batch(
        state.engine.clone(),
        units,
        state.config.convert_concurrency,
        Duration::from_secs(state.config.convert_timeout_secs),
    )
    .await?;

    if outcome.all_failed() {
        return Err(AppError::AllFailed {
            message: "No valid conversions".to_string(),
            errors: outcome.error_strings(),
        });
    }

    let archive = archive_service::build_zip(&outcome.results, &outcome.failures)?;
    let filename = archive_service::zip_filename(started_at);

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        archive,
    ))
}

/// Collect input units from the multipart form.
///
/// The manual text block (field `manual_text`), if non-blank, becomes one
/// synthetic unit processed before the files; blank manual text
/// contributes no unit. Every `files` part becomes a unit in upload
/// order — duplicates included, an empty file included (it will fail
/// as `empty file` rather than disappear from the totals).
async fn collect_units(mut multipart: Multipart) -> Result<Vec<InputUnit>, AppError> {
    let mut manual_text: Option<String> = None;
    let mut files: Vec<InputUnit> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("manual_text") => {
                manual_text = Some(field.text().await?);
            }
            Some("files") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "unknown".to_string());
                // TAC telegrams are ASCII; anything else decodes lossily
                let text = String::from_utf8_lossy(&field.bytes().await?).into_owned();
                files.push(InputUnit::from_file(&filename, text));
            }
            _ => {}
        }
    }

    let mut units = Vec::with_capacity(files.len() + 1);
    if let Some(text) = manual_text {
        if !text.trim().is_empty() {
            units.push(InputUnit::manual(text));
        }
    }
    units.extend(files);

    Ok(units)
}
