//! Error types for the tracking core.

use thiserror::Error;

/// Errors surfaced by the element-set loader.
///
/// Individual malformed entries are skipped, not reported here; this only
/// fires when a whole batch yields nothing usable.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no valid element sets found")]
    NoValidEntries,
}

/// Errors surfaced by the boundary-geometry loader.
#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error("invalid boundary JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("position has {0} coordinates, expected at least 2")]
    ShortPosition(usize),
}

/// Per-object, per-tick propagation failures.
///
/// These are values, never panics: one failing satellite must not take the
/// rest of the batch down with it.
#[derive(Error, Debug)]
pub enum PropagationError {
    #[error("propagation model error: {0}")]
    Model(String),

    #[error("propagation produced a non-finite coordinate")]
    NonFinite,

    #[error("propagation produced out-of-range coordinates (lon {lon}, lat {lat})")]
    OutOfRange { lon: f64, lat: f64 },
}
