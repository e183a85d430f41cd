//! Status message composition.

use serde::{Deserialize, Serialize};

use crate::classification::{Bucket, Classification};

/// GitHub rejects status descriptions longer than this.
pub const STATUS_DESCRIPTION_LIMIT: usize = 140;

const TRUNCATION_MARKER: &str = "...";

/// Configurable strings used to explain a verdict.
///
/// Category entries are prefixes; the affected identifiers follow them,
/// joined by `", "`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    pub success: String,
    pub failure: String,
    pub unknown: String,
    pub invalid_cla: String,
    pub unknown_cla: String,
    pub invalid_signoff: String,
    pub unknown_signoff: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        MessageCatalog {
            success: "The authors of this pull request have valid CLAs and signed off on their commits.".to_string(),
            failure: "This pull request does not meet the contribution requirements.".to_string(),
            unknown: "The validity of this pull request could not be determined.".to_string(),
            invalid_cla: "The following users do not have valid CLAs: ".to_string(),
            unknown_cla: "The following users could not be checked for a CLA: ".to_string(),
            invalid_signoff: "The following users did not sign off on their commits: ".to_string(),
            unknown_signoff: "The following users did not sign off on their commits: ".to_string(),
        }
    }
}

impl MessageCatalog {
    fn category(&self, bucket: Bucket) -> Option<&str> {
        match bucket {
            Bucket::InvalidCla => Some(&self.invalid_cla),
            Bucket::UnknownCla => Some(&self.unknown_cla),
            Bucket::InvalidSignedOff => Some(&self.invalid_signoff),
            Bucket::UnknownSignedOff => Some(&self.unknown_signoff),
            Bucket::ValidCla | Bucket::ValidSignedOff => None,
        }
    }
}

/// Render a classification into a newline-joined explanation.
///
/// Problem fragments follow a fixed precedence: invalid CLA, unknown CLA,
/// invalid signoff, unknown signoff. A header is always prepended: failure
/// if any fragment exists, success if both valid buckets are populated,
/// unknown otherwise.
pub fn compose(classification: &Classification, catalog: &MessageCatalog) -> String {
    let mut parts: Vec<String> = Bucket::FAILURES
        .iter()
        .filter_map(|bucket| {
            let ids = classification.bucket(*bucket);
            if ids.is_empty() {
                return None;
            }
            let prefix = catalog.category(*bucket)?;
            Some(format!("{}{}", prefix, ids.join(", ")))
        })
        .collect();

    let header = if !parts.is_empty() {
        &catalog.failure
    } else if !classification.valid_cla.is_empty() && !classification.valid_signed_off.is_empty() {
        &catalog.success
    } else {
        &catalog.unknown
    };
    parts.insert(0, header.clone());

    parts.join("\n")
}

/// Bound a message to [`STATUS_DESCRIPTION_LIMIT`] characters.
///
/// Longer messages keep their first 137 characters followed by `...`.
pub fn truncate_description(message: &str) -> String {
    if message.chars().count() <= STATUS_DESCRIPTION_LIMIT {
        return message.to_string();
    }
    let keep = STATUS_DESCRIPTION_LIMIT - TRUNCATION_MARKER.len();
    let mut out: String = message.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MessageCatalog {
        MessageCatalog {
            success: "OK".to_string(),
            failure: "FAIL".to_string(),
            unknown: "UNKNOWN".to_string(),
            invalid_cla: "no CLA: ".to_string(),
            unknown_cla: "unknown CLA: ".to_string(),
            invalid_signoff: "bad signoff: ".to_string(),
            unknown_signoff: "no signoff: ".to_string(),
        }
    }

    #[test]
    fn success_header_needs_both_valid_buckets() {
        let mut c = Classification::new();
        c.push(Bucket::ValidCla, "a@x");
        c.push(Bucket::ValidSignedOff, "a@x");
        assert_eq!(compose(&c, &catalog()), "OK");
    }

    #[test]
    fn one_valid_bucket_only_is_unknown() {
        let mut c = Classification::new();
        c.push(Bucket::ValidCla, "a@x");
        assert_eq!(compose(&c, &catalog()), "UNKNOWN");
    }

    #[test]
    fn empty_classification_is_unknown() {
        assert_eq!(compose(&Classification::new(), &catalog()), "UNKNOWN");
    }

    #[test]
    fn fragments_follow_fixed_precedence() {
        let mut c = Classification::new();
        c.push(Bucket::UnknownSignedOff, "d@x");
        c.push(Bucket::InvalidSignedOff, "carol");
        c.push(Bucket::UnknownCla, "b@x");
        c.push(Bucket::InvalidCla, "a@x");
        c.push(Bucket::InvalidCla, "e@x");
        c.push(Bucket::ValidCla, "f@x");

        assert_eq!(
            compose(&c, &catalog()),
            "FAIL\nno CLA: a@x, e@x\nunknown CLA: b@x\nbad signoff: carol\nno signoff: d@x"
        );
    }

    #[test]
    fn empty_buckets_are_skipped() {
        let mut c = Classification::new();
        c.push(Bucket::UnknownCla, "b@x");
        assert_eq!(compose(&c, &catalog()), "FAIL\nunknown CLA: b@x");
    }

    #[test]
    fn short_messages_are_untouched() {
        assert_eq!(truncate_description("short"), "short");
        let exact = "x".repeat(140);
        assert_eq!(truncate_description(&exact), exact);
    }

    #[test]
    fn long_messages_keep_137_chars_and_marker() {
        let msg: String = (0..150).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let out = truncate_description(&msg);

        assert_eq!(out.chars().count(), 140);
        assert_eq!(&out[..137], &msg[..137]);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let msg = "é".repeat(150);
        let out = truncate_description(&msg);
        assert_eq!(out.chars().count(), 140);
        assert!(out.starts_with(&"é".repeat(137)));
    }

    #[test]
    fn default_catalog_has_every_entry() {
        let c = MessageCatalog::default();
        for s in [
            &c.success,
            &c.failure,
            &c.unknown,
            &c.invalid_cla,
            &c.unknown_cla,
            &c.invalid_signoff,
            &c.unknown_signoff,
        ] {
            assert!(!s.is_empty());
        }
    }
}
