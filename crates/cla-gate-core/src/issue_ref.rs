//! Issue tracker references in pull request titles.

use std::sync::OnceLock;

use regex::Regex;

/// `bug 123`, `Bug: 123`, `bug #123` (any case) or `[123]`.
fn reference_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)bug:?\s*#?(\d+)|\[(\d+)\]").ok())
        .as_ref()
}

/// Issue number referenced by `title`, if any. The leftmost reference wins.
pub fn find_issue_reference(title: &str) -> Option<&str> {
    let caps = reference_pattern()?.captures(title)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Fill `{org}` and `{id}` in an issue tracker URL template.
pub fn issue_url(template: &str, organization: &str, id: &str) -> String {
    template.replace("{org}", organization).replace("{id}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_forms() {
        assert_eq!(find_issue_reference("Fixes bug: 100"), Some("100"));
        assert_eq!(find_issue_reference("Bug 42 - crash"), Some("42"));
        assert_eq!(find_issue_reference("bug #7 again"), Some("7"));
        assert_eq!(find_issue_reference("BUG:#8"), Some("8"));
        assert_eq!(find_issue_reference("[12345] Update docs"), Some("12345"));
    }

    #[test]
    fn no_reference() {
        assert_eq!(find_issue_reference("no reference here"), None);
        assert_eq!(find_issue_reference("debugging [abc]"), None);
        assert_eq!(find_issue_reference(""), None);
    }

    #[test]
    fn leftmost_reference_wins() {
        assert_eq!(find_issue_reference("[5] also bug 6"), Some("5"));
        assert_eq!(find_issue_reference("bug 6 and [5]"), Some("6"));
    }

    #[test]
    fn builds_tracker_url() {
        assert_eq!(
            issue_url(
                "https://bugs.{org}.org/bugs/show_bug.cgi?id={id}",
                "eclipse",
                "100"
            ),
            "https://bugs.eclipse.org/bugs/show_bug.cgi?id=100"
        );
    }
}
