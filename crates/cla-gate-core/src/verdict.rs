//! Pull request level verdict.

use cla_gate_forge::CommitState;
use cla_gate_state::AuditKey;
use serde::Serialize;

use crate::classification::Classification;

/// Fold a classification into one pull request state.
///
/// Success requires every failure-class bucket to be empty and at least one
/// committer to be positively valid (CLA or signoff). An empty classification
/// is a failure.
pub fn derive_state(classification: &Classification) -> CommitState {
    let any_valid =
        !classification.valid_cla.is_empty() || !classification.valid_signed_off.is_empty();

    if !classification.has_failures() && any_valid {
        CommitState::Success
    } else {
        CommitState::Failure
    }
}

/// What gets reported to the forge for one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub state: CommitState,
    /// Full composed message, as used in notifications.
    pub message: String,
    /// `message` bounded to the forge's status description limit.
    pub description: String,
    pub audit_key: AuditKey,
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        self.state == CommitState::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Bucket;

    fn with(entries: &[(Bucket, &str)]) -> Classification {
        let mut c = Classification::new();
        for (bucket, id) in entries {
            c.push(*bucket, *id);
        }
        c
    }

    #[test]
    fn empty_is_failure() {
        assert_eq!(derive_state(&Classification::new()), CommitState::Failure);
    }

    #[test]
    fn valid_cla_alone_is_success() {
        let c = with(&[(Bucket::ValidCla, "a@x")]);
        assert_eq!(derive_state(&c), CommitState::Success);
    }

    #[test]
    fn valid_signoff_alone_is_success() {
        let c = with(&[(Bucket::ValidSignedOff, "a@x")]);
        assert_eq!(derive_state(&c), CommitState::Success);
    }

    #[test]
    fn any_failure_bucket_fails() {
        for failure in Bucket::FAILURES {
            let c = with(&[
                (Bucket::ValidCla, "a@x"),
                (Bucket::ValidSignedOff, "a@x"),
                (failure, "b@x"),
            ]);
            assert_eq!(derive_state(&c), CommitState::Failure, "{failure:?}");
        }
    }

    #[test]
    fn matches_rule_for_every_bucket_combination() {
        // Each of the six buckets either empty or holding one id: 64 cases.
        for mask in 0u8..64 {
            let mut c = Classification::new();
            for (i, bucket) in Bucket::ALL.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    c.push(*bucket, "id");
                }
            }

            let failures_empty = Bucket::FAILURES.iter().all(|b| c.bucket(*b).is_empty());
            let some_valid = !c.valid_cla.is_empty() || !c.valid_signed_off.is_empty();
            let expected = if failures_empty && some_valid {
                CommitState::Success
            } else {
                CommitState::Failure
            };
            assert_eq!(derive_state(&c), expected, "mask {mask:06b}");
        }
    }
}
