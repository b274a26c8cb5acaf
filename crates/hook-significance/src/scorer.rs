//! Significance scoring.
//!
//! The score is a sum of independent signals. Each signal group appends
//! its reasons in a fixed order: duration, files, commits, churn, branch.
//! Scoring is pure: no I/O and the same context always gives the same result.

use crate::parse::{DiffStat, FileChange, parse_commits, parse_diff_stat, parse_file_change};
use hook_common::SessionContext;
use regex::{RegexSet, RegexSetBuilder};
use serde::Serialize;

const LONG_SESSION_SECS: u64 = 1800;
const SESSION_SECS: u64 = 600;

const MIN_SIGNIFICANT_FILES: usize = 3;
const FILE_VOLUME_POINTS: f64 = 2.0;
const FILE_WEIGHT_FACTOR: f64 = 0.5;
// Weights at or above this get a per-file reason
const REPORTED_FILE_WEIGHT: f64 = 2.0;

const POINTS_PER_COMMIT: f64 = 3.0;
const SIGNIFICANT_COMMIT_POINTS: f64 = 2.0;

const MIN_CHURN_LINES: u64 = 10;
const CHURN_LINES_PER_POINT: f64 = 20.0;
const MAX_CHURN_POINTS: f64 = 5.0;

const BRANCH_POINTS: f64 = 1.0;

/// Paths that never count as real work: build output, vendored code,
/// lock files, logs, binaries.
const TRIVIAL_PATTERNS: &[&str] = &[
    r"(^|/)node_modules/",
    r"(^|/)target/",
    r"(^|/)(dist|build|out)/",
    r"(^|/)vendor/",
    r"(^|/)__pycache__/",
    r"(^|/)\.venv/",
    r"(^|/)\.git/",
    r"\.lock$",
    r"(^|/)package-lock\.json$",
    r"\.log$",
    r"\.min\.(js|css)$",
    r"\.(png|jpe?g|gif|ico|webp|pdf|zip|gz|tar|exe|dll|so|dylib|pyc|class|o|a|bin|woff2?)$",
    r"(^|/)\.ds_store$",
];

/// Extension weights. Code is 2.0, config and docs 1.2 to 1.5.
const EXTENSION_WEIGHTS: &[(&str, f64)] = &[
    ("rs", 2.0),
    ("py", 2.0),
    ("ts", 2.0),
    ("tsx", 2.0),
    ("js", 2.0),
    ("jsx", 2.0),
    ("go", 2.0),
    ("java", 2.0),
    ("kt", 2.0),
    ("swift", 2.0),
    ("c", 2.0),
    ("h", 2.0),
    ("cpp", 2.0),
    ("hpp", 2.0),
    ("cs", 2.0),
    ("rb", 2.0),
    ("php", 2.0),
    ("scala", 2.0),
    ("sh", 2.0),
    ("sql", 1.5),
    ("toml", 1.5),
    ("yaml", 1.3),
    ("yml", 1.3),
    ("html", 1.3),
    ("css", 1.3),
    ("json", 1.2),
    ("md", 1.2),
];

/// Commit message markers and the tag each one maps to.
/// Matching is case-insensitive; the first marker found wins.
pub const SIGNIFICANT_COMMIT_MARKERS: &[(&str, &str)] = &[
    ("feat:", "feat"),
    ("fix:", "fix"),
    ("breaking", "breaking"),
    ("performance", "performance"),
    ("security", "security"),
    ("refactor", "refactor"),
    ("test:", "test"),
];

/// Branch prefixes that earn the branch bonus, with their tag.
pub const BONUS_BRANCH_PREFIXES: &[(&str, &str)] = &[("feature/", "feature"), ("fix/", "fix")];

/// Result of scoring one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub reasons: Vec<String>,
}

impl ScoreResult {
    fn add(&mut self, points: f64) {
        self.score += points;
    }

    fn add_with_reason(&mut self, points: f64, reason: String) {
        self.score += points;
        self.reasons.push(reason);
    }
}

/// Score a session context.
pub fn score(ctx: &SessionContext) -> ScoreResult {
    let mut result = ScoreResult::default();

    score_duration(ctx.session_duration, &mut result);
    score_files(&ctx.file_changes, &mut result);
    score_commits(&ctx.recent_commits, &mut result);
    score_churn(ctx, &mut result);
    score_branch(ctx.branch(), &mut result);

    result
}

fn score_duration(secs: u64, result: &mut ScoreResult) {
    let minutes = secs / 60;
    if secs >= LONG_SESSION_SECS {
        result.add_with_reason(2.0, format!("Long session ({} min)", minutes));
    } else if secs >= SESSION_SECS {
        result.add_with_reason(1.0, format!("Session ({} min)", minutes));
    }
}

fn score_files(lines: &[String], result: &mut ScoreResult) {
    let trivial = trivial_path_set();
    let significant: Vec<FileChange> = lines
        .iter()
        .filter_map(|line| parse_file_change(line))
        .filter(|change| !is_trivial_path(trivial.as_ref(), &change.path))
        .collect();

    if significant.len() >= MIN_SIGNIFICANT_FILES {
        result.add_with_reason(
            FILE_VOLUME_POINTS,
            format!("Modified {} files", significant.len()),
        );
    }

    for change in &significant {
        let Some(weight) = extension_weight(&change.path) else {
            continue;
        };
        let points = weight * FILE_WEIGHT_FACTOR;
        if weight >= REPORTED_FILE_WEIGHT {
            result.add_with_reason(points, format!("Code change: {}", change.path));
        } else {
            result.add(points);
        }
    }
}

fn trivial_path_set() -> Option<RegexSet> {
    RegexSetBuilder::new(TRIVIAL_PATTERNS)
        .case_insensitive(true)
        .build()
        .ok()
}

fn is_trivial_path(trivial: Option<&RegexSet>, path: &str) -> bool {
    trivial.is_some_and(|set| set.is_match(path))
}

/// Weight for a path's extension, if it has a listed one.
pub fn extension_weight(path: &str) -> Option<f64> {
    let file_name = path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        // Dotfiles like `.gitignore` have no extension
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    EXTENSION_WEIGHTS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, weight)| *weight)
}

fn score_commits(lines: &[String], result: &mut ScoreResult) {
    let commits = parse_commits(lines);
    if commits.is_empty() {
        return;
    }

    let count = commits.len();
    result.add_with_reason(
        POINTS_PER_COMMIT * count as f64,
        if count == 1 {
            "1 commit".to_string()
        } else {
            format!("{} commits", count)
        },
    );

    for commit in &commits {
        if commit_marker(&commit.subject).is_some() {
            result.add_with_reason(
                SIGNIFICANT_COMMIT_POINTS,
                format!("Significant commit: {}", commit.subject),
            );
        }
    }
}

/// Tag of the first significant marker in a commit message.
pub fn commit_marker(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    SIGNIFICANT_COMMIT_MARKERS
        .iter()
        .find(|(marker, _)| lower.contains(marker))
        .map(|(_, tag)| *tag)
}

fn score_churn(ctx: &SessionContext, result: &mut ScoreResult) {
    let stat = ctx
        .stat_blocks()
        .map(parse_diff_stat)
        .fold(DiffStat::default(), |acc, s| acc + s);
    let churn = stat.churn();

    if churn >= MIN_CHURN_LINES {
        let points = (churn as f64 / CHURN_LINES_PER_POINT).min(MAX_CHURN_POINTS);
        result.add_with_reason(points, format!("{} lines changed", churn));
    }
}

/// Tag for a branch that earns the bonus.
pub fn branch_kind(branch: &str) -> Option<&'static str> {
    let lower = branch.to_lowercase();
    BONUS_BRANCH_PREFIXES
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
        .map(|(_, kind)| *kind)
}

fn score_branch(branch: Option<&str>, result: &mut ScoreResult) {
    let Some(branch) = branch else {
        return;
    };
    if let Some(kind) = branch_kind(branch) {
        result.add_with_reason(BRANCH_POINTS, format!("Work on {} branch {}", kind, branch));
    }
}
