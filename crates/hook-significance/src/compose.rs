//! Record content and tags.

use crate::parse::parse_commits;
use crate::scorer::{ScoreResult, branch_kind, commit_marker};
use hook_common::SessionContext;
use hook_memory::{MemoryRecord, RecordMetadata};
use std::collections::BTreeSet;

/// Reasons kept in the record content. The rest only influenced the score.
pub const MAX_CONTENT_REASONS: usize = 3;

// Present on every captured record
const CAPTURE_TAG: &str = "session-capture";

/// One-line summary of a session.
///
/// `Claude session in {project}[ on {branch}][. {reason}. {reason}. {reason}]`
pub fn compose(ctx: &SessionContext, reasons: &[String]) -> String {
    let mut content = format!("Claude session in {}", ctx.project_label());

    if let Some(branch) = ctx.branch() {
        content.push_str(" on ");
        content.push_str(branch);
    }

    let kept = &reasons[..reasons.len().min(MAX_CONTENT_REASONS)];
    if !kept.is_empty() {
        content.push_str(". ");
        content.push_str(&kept.join(". "));
    }

    content
}

/// Tags describing a session: capture marker, project, branch kind, and
/// the kinds of significant commits it contains.
pub fn tags(ctx: &SessionContext) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    tags.insert(CAPTURE_TAG.to_string());
    tags.insert(ctx.project_label());

    if let Some(kind) = ctx.branch().and_then(branch_kind) {
        tags.insert(kind.to_string());
    }

    for commit in parse_commits(&ctx.recent_commits) {
        if let Some(kind) = commit_marker(&commit.subject) {
            tags.insert(kind.to_string());
        }
    }

    tags
}

/// Build the queue record for a scored session.
pub fn build_record(ctx: &SessionContext, result: &ScoreResult) -> MemoryRecord {
    let metadata = RecordMetadata::new(
        tags(ctx),
        ctx.project_label(),
        ctx.branch().map(String::from),
        result.score,
    );
    MemoryRecord::new(compose(ctx, &result.reasons), metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::score;

    fn demo_context() -> SessionContext {
        SessionContext {
            project_name: Some("demo".to_string()),
            git_branch: Some("feature/x".to_string()),
            session_duration: 2000,
            recent_commits: vec!["abc|feat: add thing|me|1h ago".to_string()],
            file_changes: vec!["M src/app.py".to_string()],
            diff_stats: Some("1 file changed, 15 insertions(+), 2 deletions(-)".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_compose_demo() {
        let ctx = demo_context();
        let result = score(&ctx);
        insta::assert_snapshot!(
            compose(&ctx, &result.reasons),
            @"Claude session in demo on feature/x. Long session (33 min). Code change: src/app.py. 1 commit"
        );
    }

    #[test]
    fn test_compose_keeps_first_three_reasons() {
        let ctx = SessionContext {
            project_name: Some("p".to_string()),
            ..Default::default()
        };
        let reasons: Vec<String> = ["r1", "r2", "r3", "r4", "r5"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(compose(&ctx, &reasons), "Claude session in p. r1. r2. r3");
    }

    #[test]
    fn test_compose_without_branch_or_reasons() {
        let ctx = SessionContext {
            project_name: Some("p".to_string()),
            git_branch: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(compose(&ctx, &[]), "Claude session in p");
        assert_eq!(
            compose(&ctx, &["only".to_string()]),
            "Claude session in p. only"
        );
    }

    #[test]
    fn test_tags() {
        let mut ctx = demo_context();
        ctx.recent_commits.push("def|fix: edge case|me|2h ago".to_string());
        ctx.recent_commits.push("012|chore: deps|me|3h ago".to_string());

        let tags: Vec<String> = tags(&ctx).into_iter().collect();
        assert_eq!(tags, vec!["demo", "feat", "feature", "fix", "session-capture"]);
    }

    #[test]
    fn test_build_record() {
        let ctx = demo_context();
        let record = build_record(&ctx, &score(&ctx));
        assert!(record.content.starts_with("Claude session in demo on feature/x. "));
        assert_eq!(record.metadata.project, "demo");
        assert_eq!(record.metadata.git_branch.as_deref(), Some("feature/x"));
        assert_eq!(record.metadata.significance_score, 9.85);
        assert!(record.metadata.tags.contains("session-capture"));
    }
}
