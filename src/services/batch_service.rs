//! Batch orchestrator: fan a set of input units through the conversion
//! engine, isolating failures per unit.
//!
//! # Guarantees
//!
//! - One unit's failure (engine error, timeout, even a panic) never
//!   aborts its siblings
//! - Results and failures each preserve input order
//! - `results.len() + failures.len()` always equals the unit count
//!
//! Units run on the blocking thread pool with bounded concurrency.
//! `buffered` yields outcomes in submission order, so no reordering
//! pass is needed before emission.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::{
    engine::ConversionEngine,
    error::AppError,
    models::conversion::{ConversionFailure, ConvertedUnit, InputUnit},
};

/// Aggregated outcome of one batch.
pub struct BatchOutcome {
    /// Successful conversions, in input order
    pub results: Vec<ConvertedUnit>,

    /// Failed conversions, in input order
    pub failures: Vec<ConversionFailure>,
}

impl BatchOutcome {
    pub fn total_processed(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// True when every unit failed; callers turn this into a request-level
    /// 400 instead of a normal response.
    pub fn all_failed(&self) -> bool {
        self.results.is_empty() && !self.failures.is_empty()
    }

    /// Failure messages in `name: reason` form for response bodies.
    pub fn error_strings(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}

/// Run a batch of input units through the engine.
///
/// # Errors
///
/// `EmptyBatch` if there are no units at all. Per-unit failures are NOT
/// errors here; they come back as data inside the outcome.
pub async fn run_batch(
    engine: Arc<dyn ConversionEngine>,
    units: Vec<InputUnit>,
    concurrency: usize,
    timeout: Duration,
) -> Result<BatchOutcome, AppError> {
    if units.is_empty() {
        return Err(AppError::EmptyBatch);
    }

    let outcomes: Vec<Result<ConvertedUnit, ConversionFailure>> = stream::iter(units)
        .map(|unit| {
            let engine = engine.clone();
            async move { convert_unit(engine, unit, timeout).await }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut results = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(converted) => results.push(converted),
            Err(failure) => failures.push(failure),
        }
    }

    Ok(BatchOutcome { results, failures })
}

/// Convert one unit, converting every failure mode into data.
async fn convert_unit(
    engine: Arc<dyn ConversionEngine>,
    unit: InputUnit,
    timeout: Duration,
) -> Result<ConvertedUnit, ConversionFailure> {
    let InputUnit {
        name,
        label,
        source,
        text,
    } = unit;

    if text.trim().is_empty() {
        return Err(ConversionFailure {
            label,
            message: "empty file".to_string(),
        });
    }

    // The engine is synchronous CPU work; run it off the async runtime
    let task = tokio::task::spawn_blocking(move || engine.convert(text.trim()));

    match tokio::time::timeout(timeout, task).await {
        // Timer fired before the engine finished. The blocking task keeps
        // running to completion in the background, but this unit is done.
        Err(_) => Err(ConversionFailure {
            label,
            message: format!(
                "decoding error: conversion timed out after {}s",
                timeout.as_secs()
            ),
        }),
        // Engine panicked; contain it to this unit
        Ok(Err(join_err)) => {
            tracing::error!(unit = %label, error = %join_err, "conversion task aborted");
            Err(ConversionFailure {
                label,
                message: "decoding error: conversion task aborted".to_string(),
            })
        }
        Ok(Ok(Err(engine_err))) => Err(ConversionFailure {
            label,
            message: engine_err.to_string(),
        }),
        Ok(Ok(Ok(xml))) => Ok(ConvertedUnit {
            name,
            size_bytes: xml.len(),
            content: xml,
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Engine stub: fails units containing "BAD", sleeps on "SLOW",
    /// panics on "PANIC", otherwise echoes a fake document.
    struct StubEngine;

    impl ConversionEngine for StubEngine {
        fn convert(&self, tac: &str) -> Result<String, EngineError> {
            if tac.contains("PANIC") {
                panic!("engine blew up");
            }
            if tac.contains("SLOW") {
                std::thread::sleep(Duration::from_millis(300));
            }
            if tac.contains("BAD") {
                return Err(EngineError::Decode("invalid station identifier".into()));
            }
            Ok(format!("<converted>{tac}</converted>"))
        }
    }

    fn unit(label: &str, text: &str) -> InputUnit {
        InputUnit {
            name: label.to_string(),
            label: label.to_string(),
            source: label.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn partial_failure_preserves_order_and_counts() {
        let outcome = run_batch(
            Arc::new(StubEngine),
            vec![
                unit("one", "OK 1"),
                unit("two", "BAD 2"),
                unit("three", "OK 3"),
            ],
            4,
            TIMEOUT,
        )
        .await
        .unwrap();

        assert_eq!(outcome.total_processed(), 3);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(!outcome.all_failed());
        // Order within each list follows input order
        assert_eq!(outcome.results[0].name, "one");
        assert_eq!(outcome.results[1].name, "three");
        assert_eq!(outcome.failures[0].label, "two");
    }

    #[tokio::test]
    async fn all_failed_is_flagged_not_erred() {
        let outcome = run_batch(
            Arc::new(StubEngine),
            vec![unit("a", "BAD"), unit("b", "BAD")],
            2,
            TIMEOUT,
        )
        .await
        .unwrap();

        assert!(outcome.all_failed());
        assert_eq!(outcome.error_strings().len(), 2);
        assert!(outcome.error_strings()[0].starts_with("a: "));
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let result = run_batch(Arc::new(StubEngine), vec![], 4, TIMEOUT).await;
        assert!(matches!(result, Err(AppError::EmptyBatch)));
    }

    #[tokio::test]
    async fn blank_unit_fails_as_empty_file() {
        let outcome = run_batch(
            Arc::new(StubEngine),
            vec![unit("blank.txt", "   \n ")],
            4,
            TIMEOUT,
        )
        .await
        .unwrap();

        assert!(outcome.all_failed());
        assert_eq!(outcome.error_strings(), vec!["blank.txt: empty file"]);
    }

    #[tokio::test]
    async fn stalled_unit_times_out_without_stalling_siblings() {
        let outcome = run_batch(
            Arc::new(StubEngine),
            vec![unit("slow", "SLOW"), unit("fast", "OK")],
            2,
            Duration::from_millis(50),
        )
        .await
        .unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].name, "fast");
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn panicking_unit_is_contained() {
        let outcome = run_batch(
            Arc::new(StubEngine),
            vec![unit("boom", "PANIC"), unit("ok", "OK")],
            2,
            TIMEOUT,
        )
        .await
        .unwrap();

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].label, "boom");
    }

    #[tokio::test]
    async fn size_bytes_matches_utf8_length() {
        let outcome = run_batch(Arc::new(StubEngine), vec![unit("u", "OK")], 1, TIMEOUT)
            .await
            .unwrap();
        let converted = &outcome.results[0];
        assert_eq!(converted.size_bytes, converted.content.len());
    }
}
