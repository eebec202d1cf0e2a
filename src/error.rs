//! Error types for the engine.
//!
//! Pure modules ([`crate::utils::haversine`], [`crate::utils::polyline`])
//! return explicit errors and never panic past their boundary. I/O-side
//! failures are isolated per entity and per operation: a failed route
//! request or a dropped zone feed must never abort monitoring for other
//! entities.

use thiserror::Error;

/// Failures while decoding an encoded polyline string.
///
/// A decode failure discards the whole route; a partially decoded
/// geometry is never exposed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The input ended in the middle of a 5-bit continuation sequence.
    #[error("polyline ended mid-sequence at byte {index}")]
    UnexpectedEnd { index: usize },

    /// A reconstructed point fell outside the valid WGS84 range,
    /// which means the input was not a well-formed polyline.
    #[error("decoded coordinate out of range: ({latitude}, {longitude})")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },

    /// A value ran past the width of the accumulator: more continuation
    /// bytes than any well-formed delta can carry.
    #[error("polyline value too long at byte {index}")]
    ValueTooLong { index: usize },
}

/// Engine-level failure taxonomy.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A coordinate outside the WGS84 domain was rejected at ingestion.
    /// The entity's prior state is retained.
    #[error("invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Zone radii must be strictly positive.
    #[error("zone radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    /// An upstream collaborator (zone storage, location source)
    /// disconnected. The monitor freezes at its last-known state and
    /// resumes transparently on reconnect.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The routing provider failed or returned zero routes. Route
    /// absence is a normal, recoverable state.
    #[error("no route available")]
    RouteUnavailable,

    /// Location access was revoked. Terminal for that entity's
    /// tracking: publishing stops, the last known state is kept.
    #[error("location access revoked")]
    PermissionDenied,

    /// A malformed polyline payload.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
