//! Per-pull-request classification of committers.
//!
//! A [`Classification`] is created fresh for every evaluation, filled by the
//! committer evaluator, then handed by shared reference to the composer and
//! the audit recorder. Its serialized form is the audit record.

use cla_gate_forge::StatusRecord;
use serde::{Deserialize, Serialize};

/// One of the six committer buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    ValidCla,
    InvalidCla,
    UnknownCla,
    ValidSignedOff,
    InvalidSignedOff,
    UnknownSignedOff,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::ValidCla,
        Bucket::InvalidCla,
        Bucket::UnknownCla,
        Bucket::ValidSignedOff,
        Bucket::InvalidSignedOff,
        Bucket::UnknownSignedOff,
    ];

    /// Buckets whose non-emptiness fails a pull request.
    pub const FAILURES: [Bucket; 4] = [
        Bucket::InvalidCla,
        Bucket::UnknownCla,
        Bucket::InvalidSignedOff,
        Bucket::UnknownSignedOff,
    ];
}

/// The six buckets plus third-party status history.
///
/// Identifiers are emails or forge logins, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "validCLA")]
    pub valid_cla: Vec<String>,
    #[serde(rename = "invalidCLA")]
    pub invalid_cla: Vec<String>,
    #[serde(rename = "unknownCLA")]
    pub unknown_cla: Vec<String>,
    #[serde(rename = "validSignedOff")]
    pub valid_signed_off: Vec<String>,
    #[serde(rename = "invalidSignedOff")]
    pub invalid_signed_off: Vec<String>,
    #[serde(rename = "unknownSignedOff")]
    pub unknown_signed_off: Vec<String>,
    #[serde(rename = "StatusHistory", default)]
    pub status_history: Vec<StatusRecord>,
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bucket: Bucket, id: impl Into<String>) {
        self.bucket_mut(bucket).push(id.into());
    }

    pub fn bucket(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::ValidCla => &self.valid_cla,
            Bucket::InvalidCla => &self.invalid_cla,
            Bucket::UnknownCla => &self.unknown_cla,
            Bucket::ValidSignedOff => &self.valid_signed_off,
            Bucket::InvalidSignedOff => &self.invalid_signed_off,
            Bucket::UnknownSignedOff => &self.unknown_signed_off,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::ValidCla => &mut self.valid_cla,
            Bucket::InvalidCla => &mut self.invalid_cla,
            Bucket::UnknownCla => &mut self.unknown_cla,
            Bucket::ValidSignedOff => &mut self.valid_signed_off,
            Bucket::InvalidSignedOff => &mut self.invalid_signed_off,
            Bucket::UnknownSignedOff => &mut self.unknown_signed_off,
        }
    }

    /// True when any failure-class bucket holds an identifier.
    pub fn has_failures(&self) -> bool {
        Bucket::FAILURES.iter().any(|b| !self.bucket(*b).is_empty())
    }

    /// Total identifiers across all six buckets.
    pub fn total_entries(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.bucket(*b).len()).sum()
    }
}
