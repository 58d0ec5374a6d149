//! METAR TAC -> IWXXM conversion engine.
//!
//! The rest of the application only sees the [`ConversionEngine`] trait:
//! one input text unit in, one XML document out, with every failure
//! normalized into the three [`EngineError`] kinds. The batch orchestrator
//! and handlers never need to know how decoding or encoding works.

pub mod decoder;
pub mod encoder;

use decoder::decode_metar;
use encoder::encode_iwxxm;

/// Normalized engine error taxonomy.
///
/// Decoding and encoding each carry a human-readable detail string.
/// `EmptyInput` is raised before the engine proper runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// TAC message could not be decoded.
    #[error("decoding error: {0}")]
    Decode(String),

    /// Decoded report could not be encoded as IWXXM XML.
    #[error("encoding error: {0}")]
    Encode(String),

    /// Input was empty or whitespace-only.
    #[error("empty input")]
    EmptyInput,
}

/// Uniform contract over the conversion engine.
///
/// Implementations must be safe to call concurrently: each call is
/// independent, and one unit's failure must never affect sibling units.
pub trait ConversionEngine: Send + Sync {
    /// Convert a single METAR/SPECI TAC message to IWXXM XML text.
    fn convert(&self, tac: &str) -> Result<String, EngineError>;
}

/// The built-in ICAO Annex 3 engine: decode the TAC message into a
/// structured report, then serialize it as an IWXXM document.
///
/// Stateless; decoding state lives entirely on the stack of each call,
/// so a single instance is shared across all requests.
#[derive(Debug, Default, Clone)]
pub struct Annex3Engine;

impl ConversionEngine for Annex3Engine {
    fn convert(&self, tac: &str) -> Result<String, EngineError> {
        let tac = tac.trim();
        if tac.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let decoded = decode_metar(tac)?;
        encode_iwxxm(&decoded, tac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_a_routine_metar() {
        let engine = Annex3Engine;
        let xml = engine
            .convert("METAR KJFK 231751Z 18012KT 10SM FEW040 15/07 A3005")
            .unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("KJFK"));
    }

    #[test]
    fn blank_input_is_empty_input() {
        let engine = Annex3Engine;
        assert_eq!(engine.convert("   \n  "), Err(EngineError::EmptyInput));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let engine = Annex3Engine;
        match engine.convert("this is not a metar") {
            Err(EngineError::Decode(_)) => {}
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
