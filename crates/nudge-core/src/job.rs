//! Job identity, lifecycle, and the in-memory job store.
//!
//! A job packages one pending relocation for the editor layer: replacement
//! text, affected range, post-apply cursor position, and a deterministic
//! identity. Identity hashes the file path together with a fingerprint of
//! the ordered declaration ids, so re-running the advisor on unchanged text
//! yields the same job id, while any edit that disturbs the declarations
//! produces a fresh one. The fingerprint is re-validated on accept; a
//! mismatch means the job is stale and must not be applied.

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::decl::Declaration;
use crate::pair_index::PairIndex;
use crate::score::Coefficients;
use crate::search::MoveReason;
use crate::types::{ContentHash, Position, Range};

// ============================================================================
// Identity
// ============================================================================

/// Deterministic job identity: `job_` plus the first 16 hex digits of the
/// hash of (file path, declaration-set fingerprint).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Derive the identity for a file state.
    pub fn compute(file_path: &str, fingerprint: &Fingerprint) -> Self {
        let hash = ContentHash::compute(&format!("{}\n{}", file_path, fingerprint.as_str()));
        JobId(format!("job_{}", &hash.as_str()[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        JobId(id.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fingerprint of a file's declaration set: the hash of the ordered
/// declaration ids. Changing any declaration's text, or the count or order
/// of declarations, changes the fingerprint; edits confined to separator
/// trivia do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(ContentHash);

impl Fingerprint {
    pub fn of_declarations(declarations: &[Declaration]) -> Self {
        let ids: Vec<&str> = declarations.iter().map(|d| d.id.as_str()).collect();
        Fingerprint(ContentHash::compute(&ids.join("\n")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

// ============================================================================
// Job
// ============================================================================

/// Job family.
///
/// `Reorder` jobs are produced by the advisor and replaced wholesale on
/// every rerun for their file; `Repair` jobs are driven by an external
/// collaborator and survive reorder syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Reorder,
    Repair,
}

/// One actionable relocation, ready for the editor to render and apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    /// Owning file path, as given by the caller.
    pub file: String,
    /// Declaration-set fingerprint at creation time.
    pub fingerprint: Fingerprint,
    /// Display title, e.g. `Move 'mb' earlier (more ordered dependencies)`.
    pub title: String,
    /// Replacement range: always the whole document.
    pub range: Range,
    /// Full replacement text.
    pub text: String,
    /// Cursor position after applying `text`.
    pub position: Position,
    pub old_index: usize,
    pub new_index: usize,
    /// Coefficients of the resulting order.
    pub coefficients: Coefficients,
    pub reason: MoveReason,
    /// Creation timestamp, ISO 8601.
    pub created_at: String,
}

impl Job {
    /// Whether the file has drifted from the state this job was computed on.
    pub fn is_stale(&self, current: &Fingerprint) -> bool {
        self.fingerprint != *current
    }
}

/// Format a timestamp for JSON output (ISO 8601).
pub fn format_timestamp(time: SystemTime) -> String {
    use chrono::{DateTime, Utc};

    let datetime: DateTime<Utc> = time.into();
    datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// The current time in `created_at` format.
pub fn now_timestamp() -> String {
    format_timestamp(SystemTime::now())
}

// ============================================================================
// JobStore
// ============================================================================

/// In-memory job store: primary map by job id plus a bidirectional index
/// relating file keys (path hashes) to job ids.
///
/// The store is owned by the engine layer and passed into advisor entry
/// points explicitly; nothing here is ambient global state.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: BTreeMap<JobId, Job>,
    by_file: PairIndex<ContentHash, JobId>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn file_key(path: &str) -> ContentHash {
        ContentHash::compute(path)
    }

    /// Insert one job, replacing any previous job with the same id.
    pub fn insert(&mut self, job: Job) {
        self.by_file
            .insert(Self::file_key(&job.file), job.id.clone());
        self.jobs.insert(job.id.clone(), job);
    }

    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Remove a job and unlink it from its file.
    pub fn remove(&mut self, id: &JobId) -> Option<Job> {
        let job = self.jobs.remove(id)?;
        self.by_file.remove(&Self::file_key(&job.file), id);
        Some(job)
    }

    /// Replace the reorder jobs for one file with a fresh result set.
    ///
    /// Last-write-wins: every existing `Reorder` job for the file is
    /// retired unconditionally, even when `jobs` is empty; jobs of other
    /// families are preserved. Returns the retired job ids.
    pub fn sync_file(&mut self, path: &str, jobs: Vec<Job>) -> Vec<JobId> {
        let key = Self::file_key(path);
        let existing: Vec<JobId> = self.by_file.rights(&key).cloned().collect();
        let mut retired = Vec::new();
        for id in existing {
            let is_reorder = self
                .jobs
                .get(&id)
                .is_some_and(|job| job.kind == JobKind::Reorder);
            if is_reorder {
                self.jobs.remove(&id);
                self.by_file.remove(&key, &id);
                retired.push(id);
            }
        }
        for job in jobs {
            self.insert(job);
        }
        retired
    }

    /// Jobs owned by a file, in id order.
    pub fn jobs_for_file(&self, path: &str) -> Vec<&Job> {
        self.by_file
            .rights(&Self::file_key(path))
            .filter_map(|id| self.jobs.get(id))
            .collect()
    }

    /// All live jobs, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
