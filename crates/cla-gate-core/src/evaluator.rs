//! Committer evaluation: CLA status and Signed-off-by evidence.
//!
//! Each unique committer goes through two independent checks that append
//! to a [`Classification`]:
//!
//! - CLA: ask the authority about the commit email; on a definite "no",
//!   ask again with the forge login before declaring the committer invalid.
//! - Signoff: look for a `Signed-off-by: Name <email>` line in the commit
//!   message and compare it with the committer.
//!
//! Authority failures and timeouts never abort the run; they classify the
//! committer as unknown.

use std::time::Duration;

use cla_gate_forge::{ClaAuthority, ClaStatus, Commit};
use tracing::{debug, warn};

use crate::classification::{Bucket, Classification};

const SIGNOFF_KEYWORD: &str = "Signed-off-by:";

/// A parsed `Signed-off-by` trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signoff<'a> {
    /// Everything between the keyword and the address, untrimmed.
    pub name: &'a str,
    pub email: &'a str,
}

/// Find the first line of `message` carrying a signoff trailer.
///
/// A line qualifies when it contains `Signed-off-by:` (case-sensitive) and
/// ends, with nothing after it, in `<...@...>`. Lines are split on `\n`
/// only, so a trailing `\r` disqualifies a line. The name runs up to the
/// last `<` that still leaves an `@` inside the brackets.
pub fn find_signoff(message: &str) -> Option<Signoff<'_>> {
    message.split('\n').find_map(parse_signoff_line)
}

fn parse_signoff_line(line: &str) -> Option<Signoff<'_>> {
    let start = line.find(SIGNOFF_KEYWORD)? + SIGNOFF_KEYWORD.len();
    let rest = line[start..].strip_suffix('>')?;

    let mut end = rest.len();
    while let Some(lt) = rest[..end].rfind('<') {
        let email = &rest[lt + 1..];
        if email.contains('@') {
            return Some(Signoff {
                name: &rest[..lt],
                email,
            });
        }
        end = lt;
    }
    None
}

/// Classify one commit's signoff evidence.
pub fn evaluate_signoff(commit: &Commit, classification: &mut Classification) {
    let email = &commit.committer.email;
    let login = &commit.forge_login;

    match find_signoff(&commit.message) {
        Some(signoff) if signoff.email == email => {
            classification.push(Bucket::ValidSignedOff, email.as_str());
        }
        Some(signoff) if !login.is_empty() && signoff.name.trim() == login => {
            classification.push(Bucket::ValidSignedOff, login.as_str());
        }
        Some(signoff) => {
            debug!(
                committer = %email,
                signed_as = %signoff.email,
                "Signed-off-by does not match committer"
            );
            classification.push(Bucket::InvalidSignedOff, login_or_email(commit));
        }
        None => {
            classification.push(Bucket::UnknownSignedOff, email.as_str());
        }
    }
}

/// Forge login when the commit is linked to an account, otherwise the email.
fn login_or_email(commit: &Commit) -> &str {
    if commit.forge_login.is_empty() {
        &commit.committer.email
    } else {
        &commit.forge_login
    }
}

/// Runs both checks for a committer against one CLA authority.
pub struct CommitterEvaluator<'a> {
    authority: &'a dyn ClaAuthority,
    lookup_timeout: Duration,
}

impl<'a> CommitterEvaluator<'a> {
    pub fn new(authority: &'a dyn ClaAuthority, lookup_timeout: Duration) -> Self {
        Self {
            authority,
            lookup_timeout,
        }
    }

    /// Evaluate CLA and signoff for the committer of `commit`.
    pub async fn evaluate(&self, commit: &Commit, classification: &mut Classification) {
        self.evaluate_cla(commit, classification).await;
        evaluate_signoff(commit, classification);
    }

    /// Classify the committer's CLA status, falling back to the forge login.
    pub async fn evaluate_cla(&self, commit: &Commit, classification: &mut Classification) {
        let email = &commit.committer.email;
        let login = &commit.forge_login;

        match self.lookup(email).await {
            ClaStatus::Valid => classification.push(Bucket::ValidCla, email.as_str()),
            ClaStatus::Invalid => {
                if !login.is_empty() && self.lookup(login).await == ClaStatus::Valid {
                    classification.push(Bucket::ValidCla, login.as_str());
                } else {
                    classification.push(Bucket::InvalidCla, email.as_str());
                }
            }
            ClaStatus::Unknown => classification.push(Bucket::UnknownCla, email.as_str()),
        }
    }

    /// One bounded authority query. Errors and timeouts read as `Unknown`.
    async fn lookup(&self, identity: &str) -> ClaStatus {
        match tokio::time::timeout(self.lookup_timeout, self.authority.lookup(identity)).await {
            Ok(Ok(status)) => {
                debug!(identity, ?status, "CLA lookup");
                status
            }
            Ok(Err(e)) => {
                warn!(identity, error = %e, "CLA lookup failed, treating as unknown");
                ClaStatus::Unknown
            }
            Err(_) => {
                warn!(
                    identity,
                    timeout_secs = self.lookup_timeout.as_secs(),
                    "CLA lookup timed out, treating as unknown"
                );
                ClaStatus::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cla_gate_forge::fakes::ScriptedClaAuthority;

    fn commit(email: &str, login: &str, message: &str) -> Commit {
        Commit::new("sha1", "Jane Doe", email, login, message)
    }

    // ── signoff parsing ───────────────────────────────────────────────────

    #[test]
    fn parses_trailer_at_end_of_line() {
        let s = find_signoff("Fix\n\nSigned-off-by: Jane Doe <jane@x.com>").unwrap();
        assert_eq!(s.name, " Jane Doe ");
        assert_eq!(s.email, "jane@x.com");
    }

    #[test]
    fn keyword_is_case_sensitive() {
        assert!(find_signoff("signed-off-by: Jane <jane@x.com>").is_none());
        assert!(find_signoff("Signed-Off-By: Jane <jane@x.com>").is_none());
    }

    #[test]
    fn trailer_must_end_the_line() {
        assert!(find_signoff("Signed-off-by: Jane <jane@x.com> thanks").is_none());
        assert!(find_signoff("Signed-off-by: Jane <jane@x.com>\r\n").is_none());
    }

    #[test]
    fn address_needs_an_at_sign() {
        assert!(find_signoff("Signed-off-by: Jane <jane>").is_none());
    }

    #[test]
    fn first_matching_line_wins() {
        let msg = "Signed-off-by: broken\nSigned-off-by: A <a@x.com>\nSigned-off-by: B <b@x.com>";
        let s = find_signoff(msg).unwrap();
        assert_eq!(s.email, "a@x.com");
    }

    #[test]
    fn name_extends_to_last_usable_bracket() {
        let s = find_signoff("Signed-off-by: Jane <old@x.com> <jane@x.com>").unwrap();
        assert_eq!(s.name, " Jane <old@x.com> ");
        assert_eq!(s.email, "jane@x.com");

        let s = find_signoff("Signed-off-by: Jane <jane@x.com <nope>").unwrap();
        assert_eq!(s.name, " Jane ");
        assert_eq!(s.email, "jane@x.com <nope");
    }

    #[test]
    fn keyword_may_appear_mid_line() {
        let s = find_signoff("    Signed-off-by: Jane <jane@x.com>").unwrap();
        assert_eq!(s.email, "jane@x.com");
    }

    // ── signoff classification ────────────────────────────────────────────

    #[test]
    fn matching_email_is_valid() {
        let mut c = Classification::new();
        evaluate_signoff(
            &commit("jane@x.com", "janedoe", "...\nSigned-off-by: Jane Doe <jane@x.com>"),
            &mut c,
        );
        assert_eq!(c.valid_signed_off, ["jane@x.com"]);
    }

    #[test]
    fn mismatched_email_and_name_is_invalid_by_login() {
        let mut c = Classification::new();
        evaluate_signoff(
            &commit("other@x.com", "janedoe", "...\nSigned-off-by: Jane Doe <jane@x.com>"),
            &mut c,
        );
        assert_eq!(c.invalid_signed_off, ["janedoe"]);
        assert!(c.valid_signed_off.is_empty());
    }

    #[test]
    fn name_matching_login_is_valid_by_login() {
        let mut c = Classification::new();
        evaluate_signoff(
            &commit("other@x.com", "janedoe", "Signed-off-by:  janedoe  <jane@x.com>"),
            &mut c,
        );
        assert_eq!(c.valid_signed_off, ["janedoe"]);
    }

    #[test]
    fn missing_trailer_is_unknown_by_email() {
        let mut c = Classification::new();
        evaluate_signoff(&commit("jane@x.com", "janedoe", "Just a fix"), &mut c);
        assert_eq!(c.unknown_signed_off, ["jane@x.com"]);
    }

    #[test]
    fn invalid_without_account_falls_back_to_email() {
        let mut c = Classification::new();
        evaluate_signoff(
            &commit("other@x.com", "", "Signed-off-by: <jane@x.com>"),
            &mut c,
        );
        assert_eq!(c.invalid_signed_off, ["other@x.com"]);
    }

    // ── CLA classification ────────────────────────────────────────────────

    #[tokio::test]
    async fn valid_email_is_valid_cla() {
        let authority = ScriptedClaAuthority::new().with("jane@x.com", ClaStatus::Valid);
        let evaluator = CommitterEvaluator::new(&authority, Duration::from_secs(5));
        let mut c = Classification::new();

        evaluator
            .evaluate_cla(&commit("jane@x.com", "janedoe", ""), &mut c)
            .await;

        assert_eq!(c.valid_cla, ["jane@x.com"]);
        assert_eq!(authority.queries(), ["jane@x.com"]);
    }

    #[tokio::test]
    async fn invalid_email_falls_back_to_login() {
        let authority = ScriptedClaAuthority::new()
            .with("jane@x.com", ClaStatus::Invalid)
            .with("janedoe", ClaStatus::Valid);
        let evaluator = CommitterEvaluator::new(&authority, Duration::from_secs(5));
        let mut c = Classification::new();

        evaluator
            .evaluate_cla(&commit("jane@x.com", "janedoe", ""), &mut c)
            .await;

        assert_eq!(c.valid_cla, ["janedoe"]);
        assert!(c.invalid_cla.is_empty());
        assert_eq!(authority.queries(), ["jane@x.com", "janedoe"]);
    }

    #[tokio::test]
    async fn invalid_email_and_login_is_invalid_by_email() {
        let authority = ScriptedClaAuthority::new()
            .with("jane@x.com", ClaStatus::Invalid)
            .with("janedoe", ClaStatus::Invalid);
        let evaluator = CommitterEvaluator::new(&authority, Duration::from_secs(5));
        let mut c = Classification::new();

        evaluator
            .evaluate_cla(&commit("jane@x.com", "janedoe", ""), &mut c)
            .await;

        assert_eq!(c.invalid_cla, ["jane@x.com"]);
    }

    #[tokio::test]
    async fn invalid_email_without_account_skips_retry() {
        let authority = ScriptedClaAuthority::new().with("jane@x.com", ClaStatus::Invalid);
        let evaluator = CommitterEvaluator::new(&authority, Duration::from_secs(5));
        let mut c = Classification::new();

        evaluator
            .evaluate_cla(&commit("jane@x.com", "", ""), &mut c)
            .await;

        assert_eq!(c.invalid_cla, ["jane@x.com"]);
        assert_eq!(authority.queries(), ["jane@x.com"]);
    }

    #[tokio::test]
    async fn unreachable_authority_is_unknown() {
        let authority = ScriptedClaAuthority::new().unreachable_for("jane@x.com");
        let evaluator = CommitterEvaluator::new(&authority, Duration::from_secs(5));
        let mut c = Classification::new();

        evaluator
            .evaluate_cla(&commit("jane@x.com", "janedoe", ""), &mut c)
            .await;

        assert_eq!(c.unknown_cla, ["jane@x.com"]);
        assert_eq!(authority.queries(), ["jane@x.com"]);
    }

    #[tokio::test]
    async fn evaluate_runs_both_checks() {
        let authority = ScriptedClaAuthority::new().with("jane@x.com", ClaStatus::Valid);
        let evaluator = CommitterEvaluator::new(&authority, Duration::from_secs(5));
        let mut c = Classification::new();

        evaluator
            .evaluate(
                &commit("jane@x.com", "janedoe", "Signed-off-by: Jane Doe <jane@x.com>"),
                &mut c,
            )
            .await;

        assert_eq!(c.valid_cla, ["jane@x.com"]);
        assert_eq!(c.valid_signed_off, ["jane@x.com"]);
        assert!(!c.has_failures());
    }
}
