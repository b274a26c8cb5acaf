//! Append-only storage for memory records.

use crate::schema::MemoryRecord;
use camino::{Utf8Path, Utf8PathBuf};
use hook_common::{HookError, Result};
use std::cell::RefCell;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};

// Bytes read per backward step when tailing the queue
const TAIL_CHUNK: u64 = 8 * 1024;

/// Storage seam for the capture queue.
///
/// The queue only ever grows: records are appended and the most recent
/// ones can be read back. Nothing is updated or deleted.
pub trait QueueStore {
    /// Append one record.
    fn append_record(&self, record: &MemoryRecord) -> Result<()>;

    /// Return up to `n` of the most recent records, oldest first.
    fn tail_records(&self, n: usize) -> Result<Vec<MemoryRecord>>;
}

/// JSONL-backed queue: one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonlQueue {
    /// Path to the JSONL file
    path: Utf8PathBuf,
}

impl JsonlQueue {
    /// Create a new queue handle. The file is created on first append.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get default queue path: `~/.claude/memory/capture-queue.jsonl`.
    ///
    /// Falls back to the same path relative to the current directory when
    /// the home directory is unknown or not UTF-8.
    pub fn default_path() -> Utf8PathBuf {
        let relative = Utf8PathBuf::from(".claude/memory/capture-queue.jsonl");
        dirs::home_dir()
            .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
            .map(|home| home.join(&relative))
            .unwrap_or(relative)
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Ensure the queue directory exists.
    pub fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| HookError::queue_write(self.path.as_str(), e))?;
            }
        }
        Ok(())
    }
}

impl QueueStore for JsonlQueue {
    fn append_record(&self, record: &MemoryRecord) -> Result<()> {
        self.ensure_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| HookError::queue_write(self.path.as_str(), e))?;

        let mut line = String::new();
        // Terminate a fragment left by an interrupted write so this record
        // starts on its own line
        let terminated = ends_with_newline(&mut file)
            .map_err(|e| HookError::queue_write(self.path.as_str(), e))?;
        if !terminated {
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(record)?);
        line.push('\n');

        // One write call per record so concurrent appenders do not split lines
        file.write_all(line.as_bytes())
            .map_err(|e| HookError::queue_write(self.path.as_str(), e))?;
        Ok(())
    }

    fn tail_records(&self, n: usize) -> Result<Vec<MemoryRecord>> {
        if n == 0 || !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut file =
            File::open(&self.path).map_err(|e| HookError::queue_read(self.path.as_str(), e))?;
        let lines = read_tail_lines(&mut file, n)
            .map_err(|e| HookError::queue_read(self.path.as_str(), e))?;

        let mut records = Vec::with_capacity(lines.len());
        for line in lines {
            match serde_json::from_str::<MemoryRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %self.path, "skipping unparseable queue line: {}", e);
                }
            }
        }
        Ok(records)
    }
}

/// Whether the file is empty or its last byte is a newline.
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Read the last `n` non-empty lines of `file` without scanning all of it.
///
/// Chunks are read backwards from the end until `n + 1` newlines have been
/// seen (or the start of the file is reached), so cost is bounded by the
/// size of the tail rather than the size of the queue.
fn read_tail_lines(file: &mut File, n: usize) -> io::Result<Vec<String>> {
    let mut pos = file.metadata()?.len();
    let mut buf: Vec<u8> = Vec::new();
    let mut newlines = 0usize;

    while pos > 0 && newlines <= n {
        let step = TAIL_CHUNK.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos))?;

        let mut chunk = vec![0u8; step as usize];
        file.read_exact(&mut chunk)?;
        newlines += chunk.iter().filter(|b| **b == b'\n').count();

        chunk.extend_from_slice(&buf);
        buf = chunk;
    }

    let text = String::from_utf8_lossy(&buf);
    let mut segments: Vec<&str> = text.split('\n').collect();
    if pos > 0 && !segments.is_empty() {
        // Started mid-file: the first segment is a fragment of an older line
        segments.remove(0);
    }
    if !buf.ends_with(b"\n") {
        // Unterminated final line from an interrupted write
        segments.pop();
    }

    let lines: Vec<String> = segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let skip = lines.len().saturating_sub(n);
    Ok(lines.into_iter().skip(skip).collect())
}

/// In-memory queue, for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    records: RefCell<Vec<MemoryRecord>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `tail_records` call fail.
    pub fn with_failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Make every `append_record` call fail.
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Snapshot of all records, oldest first.
    pub fn records(&self) -> Vec<MemoryRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl QueueStore for InMemoryQueue {
    fn append_record(&self, record: &MemoryRecord) -> Result<()> {
        if self.fail_writes {
            return Err(HookError::queue_write("<memory>", "write failure injected"));
        }
        self.records.borrow_mut().push(record.clone());
        Ok(())
    }

    fn tail_records(&self, n: usize) -> Result<Vec<MemoryRecord>> {
        if self.fail_reads {
            return Err(HookError::queue_read("<memory>", "read failure injected"));
        }
        let records = self.records.borrow();
        let skip = records.len().saturating_sub(n);
        Ok(records[skip..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecordMetadata;
    use tempfile::tempdir;

    fn record(content: &str) -> MemoryRecord {
        MemoryRecord::new(content, RecordMetadata::default())
    }

    fn temp_queue(dir: &tempfile::TempDir) -> JsonlQueue {
        let path = dir.path().join("memory").join("queue.jsonl");
        JsonlQueue::new(Utf8PathBuf::from_path_buf(path).unwrap())
    }

    #[test]
    fn test_append_creates_dirs_and_lines() {
        let dir = tempdir().unwrap();
        let queue = temp_queue(&dir);

        for i in 0..3 {
            queue.append_record(&record(&format!("memory {}", i))).unwrap();
        }

        let text = fs::read_to_string(queue.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(text.ends_with('\n'));
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("content").is_some());
            assert!(value.get("metadata").is_some());
            assert!(value.get("timestamp").is_some());
        }
    }

    #[test]
    fn test_tail_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let queue = temp_queue(&dir);
        assert!(queue.tail_records(20).unwrap().is_empty());
    }

    #[test]
    fn test_tail_returns_last_n_in_order() {
        let dir = tempdir().unwrap();
        let queue = temp_queue(&dir);
        for i in 0..30 {
            queue.append_record(&record(&format!("memory {}", i))).unwrap();
        }

        let tail = queue.tail_records(5).unwrap();
        let contents: Vec<&str> = tail.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["memory 25", "memory 26", "memory 27", "memory 28", "memory 29"]
        );
    }

    #[test]
    fn test_tail_spans_multiple_chunks() {
        let dir = tempdir().unwrap();
        let queue = temp_queue(&dir);
        let filler = "x".repeat(3000);
        for i in 0..10 {
            queue.append_record(&record(&format!("{} {}", filler, i))).unwrap();
        }

        let tail = queue.tail_records(4).unwrap();
        assert_eq!(tail.len(), 4);
        assert!(tail[0].content.ends_with(" 6"));
        assert!(tail[3].content.ends_with(" 9"));
    }

    #[test]
    fn test_tail_skips_partial_final_line() {
        let dir = tempdir().unwrap();
        let queue = temp_queue(&dir);
        queue.append_record(&record("complete")).unwrap();

        let mut file = OpenOptions::new().append(true).open(queue.path()).unwrap();
        file.write_all(br#"{"content":"trunc"#).unwrap();

        let tail = queue.tail_records(20).unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].content, "complete");
    }

    #[test]
    fn test_append_after_partial_line_starts_fresh_line() {
        let dir = tempdir().unwrap();
        let queue = temp_queue(&dir);
        queue.append_record(&record("first")).unwrap();

        let mut file = OpenOptions::new().append(true).open(queue.path()).unwrap();
        file.write_all(br#"{"content":"trunc"#).unwrap();

        queue.append_record(&record("second")).unwrap();

        let text = fs::read_to_string(queue.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], r#"{"content":"trunc"#);

        let tail = queue.tail_records(20).unwrap();
        let contents: Vec<&str> = tail.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_partial_final_line_does_not_take_a_tail_slot() {
        let dir = tempdir().unwrap();
        let queue = temp_queue(&dir);
        for i in 0..3 {
            queue.append_record(&record(&format!("memory {}", i))).unwrap();
        }

        let mut file = OpenOptions::new().append(true).open(queue.path()).unwrap();
        file.write_all(br#"{"content":"trunc"#).unwrap();

        let tail = queue.tail_records(2).unwrap();
        let contents: Vec<&str> = tail.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["memory 1", "memory 2"]);
    }

    #[test]
    fn test_in_memory_queue() {
        let queue = InMemoryQueue::new();
        assert!(queue.is_empty());
        for i in 0..25 {
            queue.append_record(&record(&format!("m{}", i))).unwrap();
        }
        assert_eq!(queue.len(), 25);

        let tail = queue.tail_records(20).unwrap();
        assert_eq!(tail.len(), 20);
        assert_eq!(tail[0].content, "m5");
    }

    #[test]
    fn test_in_memory_failures() {
        let queue = InMemoryQueue::new().with_failing_reads().with_failing_writes();
        assert!(matches!(
            queue.tail_records(1),
            Err(HookError::QueueRead { .. })
        ));
        assert!(matches!(
            queue.append_record(&record("x")),
            Err(HookError::QueueWrite { .. })
        ));
    }
}
