use crate::types::{BasePair, TranscriptPos};
use thiserror::Error;

/// Errors raised by the core layout computations. All of these are fatal to
/// the current render call: the caller gets no partial output and retrying
/// the same deterministic inputs cannot change the outcome.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("malformed exon coordinates for {transcript}: {detail}")]
    MalformedCoordinates { transcript: String, detail: String },

    #[error(
        "domain {domain} on {transcript} maps to {start_tp}..{end_tp}, \
         outside the coding span {coding_start}..{coding_end}"
    )]
    InvalidDomainRange {
        transcript: String,
        domain: String,
        start_tp: TranscriptPos,
        end_tp: TranscriptPos,
        coding_start: TranscriptPos,
        coding_end: TranscriptPos,
    },

    #[error("per-transcript parameter lists must all have the same length: {detail}")]
    ParameterArityMismatch { detail: String },

    #[error("figure requires {required} rows but only {available} are configured")]
    CapacityExceeded { required: u32, available: u32 },
}

impl TrackError {
    pub fn malformed(transcript: &str, detail: impl Into<String>) -> Self {
        TrackError::MalformedCoordinates {
            transcript: transcript.to_string(),
            detail: detail.into(),
        }
    }

    pub fn position_outside_exons(transcript: &str, bp: BasePair) -> Self {
        TrackError::malformed(
            transcript,
            format!("base pair {} falls outside every exon", bp),
        )
    }
}
