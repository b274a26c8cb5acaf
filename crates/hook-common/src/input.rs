//! Session context parsing.
//!
//! The context document is assembled by git/shell plumbing outside this
//! workspace and handed to the hook either as a file path or on stdin.
//! Every field is optional; a missing or `null` field simply contributes
//! nothing downstream.

use crate::error::{HookError, Result};
use camino::Utf8Path;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::{self, Read};

/// Facts describing one finished development session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Project name (usually the repository directory name)
    #[serde(default, alias = "project")]
    pub project_name: Option<String>,

    /// Working directory of the session
    #[serde(default, alias = "cwd")]
    pub working_directory: Option<String>,

    /// Current git branch
    #[serde(default, alias = "branch")]
    pub git_branch: Option<String>,

    /// Git remote or repository name
    #[serde(default, alias = "repo")]
    pub git_repo: Option<String>,

    /// Session length in seconds
    #[serde(default, alias = "duration", deserialize_with = "null_as_default")]
    pub session_duration: u64,

    /// `hash|subject|author|relative-date` lines, newest first
    #[serde(default, alias = "commits", deserialize_with = "null_as_default")]
    pub recent_commits: Vec<String>,

    /// `git status --porcelain` style lines
    #[serde(default, alias = "files", deserialize_with = "null_as_default")]
    pub file_changes: Vec<String>,

    /// `git diff --stat` output for the working tree
    #[serde(default)]
    pub diff_stats: Option<String>,

    /// `git diff --cached --stat` output
    #[serde(default)]
    pub staged_stats: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SessionContext {
    /// Parse a context document from a JSON string.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| HookError::malformed(origin, e))
    }

    /// Read and parse a context document from a file.
    pub fn from_path(path: &Utf8Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| HookError::malformed(path.as_str(), e))?;
        Self::from_json_str(&json, path.as_str())
    }

    /// Read and parse a context document from any reader.
    pub fn from_reader(mut reader: impl Read, origin: &str) -> Result<Self> {
        let mut json = String::new();
        reader
            .read_to_string(&mut json)
            .map_err(|e| HookError::malformed(origin, e))?;
        Self::from_json_str(&json, origin)
    }

    /// Read and parse a context document from stdin.
    pub fn from_stdin() -> Result<Self> {
        Self::from_reader(io::stdin().lock(), "<stdin>")
    }

    /// Project label for display.
    ///
    /// Falls back to the last component of the working directory, then
    /// to `"unknown"`.
    pub fn project_label(&self) -> String {
        if let Some(name) = non_empty(self.project_name.as_deref()) {
            return name.to_string();
        }

        non_empty(self.working_directory.as_deref())
            .and_then(|dir| {
                dir.trim_end_matches(['/', '\\'])
                    .rsplit(['/', '\\'])
                    .next()
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or("unknown")
            .to_string()
    }

    /// Branch name, if present and not blank.
    pub fn branch(&self) -> Option<&str> {
        non_empty(self.git_branch.as_deref())
    }

    /// All stat blocks (working tree and staged) that are present.
    pub fn stat_blocks(&self) -> impl Iterator<Item = &str> {
        [self.diff_stats.as_deref(), self.staged_stats.as_deref()]
            .into_iter()
            .flatten()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_context() {
        let json = r#"{
            "project_name": "demo",
            "working_directory": "/home/me/demo",
            "git_branch": "feature/x",
            "git_repo": "git@example.com:me/demo.git",
            "session_duration": 2000,
            "recent_commits": ["abc|feat: add thing|me|1h ago"],
            "file_changes": ["M src/app.py"],
            "diff_stats": "1 file changed, 15 insertions(+), 2 deletions(-)",
            "staged_stats": ""
        }"#;
        let ctx = SessionContext::from_json_str(json, "test").unwrap();
        assert_eq!(ctx.project_name.as_deref(), Some("demo"));
        assert_eq!(ctx.session_duration, 2000);
        assert_eq!(ctx.recent_commits.len(), 1);
        assert_eq!(ctx.branch(), Some("feature/x"));
        assert_eq!(ctx.stat_blocks().count(), 2);
    }

    #[test]
    fn test_parse_short_aliases() {
        let json = r#"{"project": "demo", "branch": "main", "duration": 700,
                       "commits": ["a|b|c|d"], "files": ["M x.rs"]}"#;
        let ctx = SessionContext::from_json_str(json, "test").unwrap();
        assert_eq!(ctx.project_name.as_deref(), Some("demo"));
        assert_eq!(ctx.git_branch.as_deref(), Some("main"));
        assert_eq!(ctx.session_duration, 700);
        assert_eq!(ctx.recent_commits, vec!["a|b|c|d".to_string()]);
        assert_eq!(ctx.file_changes, vec!["M x.rs".to_string()]);
    }

    #[test]
    fn test_empty_and_null_fields() {
        let ctx = SessionContext::from_json_str("{}", "test").unwrap();
        assert_eq!(ctx, SessionContext::default());

        let json = r#"{"session_duration": null, "recent_commits": null, "git_branch": null}"#;
        let ctx = SessionContext::from_json_str(json, "test").unwrap();
        assert_eq!(ctx.session_duration, 0);
        assert!(ctx.recent_commits.is_empty());
        assert_eq!(ctx.branch(), None);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = SessionContext::from_json_str("{not json", "ctx.json").unwrap_err();
        assert!(matches!(err, HookError::MalformedInput { .. }));
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let dir = tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing.json")).unwrap();
        let err = SessionContext::from_path(&path).unwrap_err();
        assert!(matches!(err, HookError::MalformedInput { .. }));
    }

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("ctx.json")).unwrap();
        fs::write(&path, r#"{"project_name": "demo"}"#).unwrap();
        let ctx = SessionContext::from_path(&path).unwrap();
        assert_eq!(ctx.project_label(), "demo");
    }

    #[test]
    fn test_project_label_fallbacks() {
        let ctx = SessionContext {
            working_directory: Some("/home/me/widgets/".to_string()),
            ..Default::default()
        };
        assert_eq!(ctx.project_label(), "widgets");

        let ctx = SessionContext {
            project_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(ctx.project_label(), "unknown");
    }
}
