//! Parsers for the text fragments in a session context.
//!
//! Grammars:
//! - commit line: `hash|subject|author|relative-date`. A line without `|`
//!   is taken as a bare subject. Extra `|` characters belong to the subject.
//! - file change: `git status --porcelain` style `XY path`, also the short
//!   `M path` form. Renames (`old -> new`) resolve to the new path.
//! - diff stat: free text containing `N file(s) changed`,
//!   `N insertion(s)(+)` and `N deletion(s)(-)`; every occurrence is summed.
//!
//! Text that does not match yields empty values rather than errors.

use regex::Regex;

/// One commit summary line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub subject: String,
    pub author: String,
    pub relative_date: String,
}

/// One changed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChange {
    /// Status code (`M`, `A`, `??`, ...); empty when the line had none
    pub status: String,
    pub path: String,
}

/// Summed counts from one or more stat blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStat {
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
}

impl DiffStat {
    /// Total changed lines.
    pub fn churn(&self) -> u64 {
        self.insertions + self.deletions
    }
}

impl std::ops::Add for DiffStat {
    type Output = DiffStat;

    fn add(self, other: DiffStat) -> DiffStat {
        DiffStat {
            files_changed: self.files_changed + other.files_changed,
            insertions: self.insertions + other.insertions,
            deletions: self.deletions + other.deletions,
        }
    }
}

/// Parse a commit line. Blank lines yield `None`.
pub fn parse_commit(line: &str) -> Option<Commit> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    let commit = match parts.as_slice() {
        [subject] => Commit {
            subject: subject.to_string(),
            ..Default::default()
        },
        [hash, subject] => Commit {
            hash: hash.to_string(),
            subject: subject.to_string(),
            ..Default::default()
        },
        [hash, subject, author] => Commit {
            hash: hash.to_string(),
            subject: subject.to_string(),
            author: author.to_string(),
            ..Default::default()
        },
        [hash, subject @ .., author, date] => Commit {
            hash: hash.to_string(),
            subject: subject.join("|"),
            author: author.to_string(),
            relative_date: date.to_string(),
        },
        [] => return None,
    };
    Some(commit)
}

/// Parse all non-blank commit lines.
pub fn parse_commits(lines: &[String]) -> Vec<Commit> {
    lines.iter().filter_map(|l| parse_commit(l)).collect()
}

/// Parse a status line. Blank lines yield `None`.
pub fn parse_file_change(line: &str) -> Option<FileChange> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (status, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((token, rest)) if is_status_code(token) => (token.to_string(), rest.trim()),
        _ => (String::new(), trimmed),
    };

    let path = match rest.rsplit_once(" -> ") {
        Some((_, new_path)) => new_path.trim(),
        None => rest,
    };
    let path = path.trim_matches('"').replace('\\', "/");

    if path.is_empty() {
        return None;
    }
    Some(FileChange { status, path })
}

fn is_status_code(token: &str) -> bool {
    (1..=2).contains(&token.len())
        && token
            .chars()
            .all(|c| matches!(c, 'M' | 'A' | 'D' | 'R' | 'C' | 'U' | 'T' | '?' | '!'))
}

/// Extract counts from a stat block.
pub fn parse_diff_stat(text: &str) -> DiffStat {
    DiffStat {
        files_changed: sum_captures(r"(\d+) files? changed", text),
        insertions: sum_captures(r"(\d+) insertions?\(\+\)", text),
        deletions: sum_captures(r"(\d+) deletions?\(-\)", text),
    }
}

fn sum_captures(pattern: &str, text: &str) -> u64 {
    let Ok(re) = Regex::new(pattern) else {
        return 0;
    };
    re.captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .sum()
}
