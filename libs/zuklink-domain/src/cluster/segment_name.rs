//! Streaming segment names
//!
//! Segments produced by per-partition consumers are named
//! `{table}__{partition}__{sequence}__{creationTime}`, for example
//! `events_REALTIME__3__17__20160101T1200Z`. Any name that does not split
//! into exactly four `__`-separated parts belongs to another segment family
//! (batch uploads, group consumers) and is not routed by this module.

use std::fmt;
use thiserror::Error;

use crate::cluster::ids::PartitionKey;

const SEPARATOR: &str = "__";

/// The sequence field of a segment name could not be read as a number
///
/// This is a recoverable anomaly: callers fall back to lexicographic ordering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Segment {segment} has a malformed sequence number '{raw}'")]
pub struct ParseAnomaly {
    pub segment: String,
    pub raw: String,
}

/// A parsed streaming segment name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentName {
    raw: String,
    table_name: String,
    partition: PartitionKey,
    sequence: String,
}

impl SegmentName {
    /// Parse a segment name, returning `None` for non-streaming names
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split(SEPARATOR).collect();
        if parts.len() != 4 {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            table_name: parts[0].to_string(),
            partition: PartitionKey::new(parts[1]),
            sequence: parts[2].to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partition(&self) -> &PartitionKey {
        &self.partition
    }

    /// Sequence number of this segment within its partition
    ///
    /// # Errors
    ///
    /// Returns a [`ParseAnomaly`] when the sequence field is not a non-negative integer.
    pub fn sequence_number(&self) -> Result<u32, ParseAnomaly> {
        self.sequence.parse::<u32>().map_err(|_| ParseAnomaly {
            segment: self.raw.clone(),
            raw: self.sequence.clone(),
        })
    }
}

impl fmt::Display for SegmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
