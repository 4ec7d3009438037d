//! Engine: advisor runs, job store ownership, and the accept/reject
//! lifecycle.
//!
//! The engine is the only owner of mutable state (the `JobStore`). Every
//! advisory run goes through `advise_text`, which replaces the stored
//! reorder advice for that file wholesale, so a rerun can never leave a
//! stale job behind (last write wins).

use std::fs;
use std::io::{self, Write as _};
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use nudge_core::advisor::{advise, AdviseRequest, AdvisorConfig};
use nudge_core::classify::Extractor;
use nudge_core::error::NudgeError;
use nudge_core::job::{Fingerprint, Job, JobId, JobStore};
use nudge_core::types::Position;
use nudge_typescript::{SourceFlavor, TypeScriptExtractor};

// ============================================================================
// Engine
// ============================================================================

/// Advisor engine: configuration plus the live job store.
#[derive(Debug, Default)]
pub struct Engine {
    config: AdvisorConfig,
    store: JobStore,
}

impl Engine {
    pub fn new(config: AdvisorConfig) -> Self {
        Engine {
            config,
            store: JobStore::new(),
        }
    }

    /// The live job store (read-only view).
    pub fn store(&self) -> &JobStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Advisory runs
    // ------------------------------------------------------------------

    /// Run the advisor on an in-memory snapshot of `path` and sync the
    /// store: the file's previous reorder advice is replaced by the new
    /// result set (empty when nothing improves).
    pub fn advise_text(
        &mut self,
        path: &str,
        text: &str,
        cursor: Position,
    ) -> Result<Option<Job>, NudgeError> {
        let extractor = extractor_for(path)?;
        let request = AdviseRequest {
            file_path: path,
            file_text: text,
            cursor,
        };
        let job = advise(&extractor, &request, &self.config)?;

        let retired = self
            .store
            .sync_file(path, job.iter().cloned().collect());
        debug!(
            file = path,
            produced = job.is_some() as usize,
            retired = retired.len(),
            "synced advice"
        );
        Ok(job)
    }

    /// Run the advisor on the file's current on-disk content.
    pub fn propose_file(
        &mut self,
        path: &str,
        cursor: Position,
    ) -> Result<Option<Job>, NudgeError> {
        extractor_for(path)?;
        let text = read_file(path)?;
        self.advise_text(path, &text, cursor)
    }

    /// Propose and immediately apply the best move to the file on disk.
    ///
    /// Returns the applied job, or `None` when the file is already in its
    /// best reachable order. The write is atomic (staged in the file's
    /// directory, then renamed over the target).
    pub fn apply_file(&mut self, path: &str) -> Result<Option<Job>, NudgeError> {
        let Some(job) = self.propose_file(path, Position::default())? else {
            return Ok(None);
        };
        write_atomic(path, &job.text)?;
        self.store.remove(&job.id);
        info!(file = path, job = %job.id, title = %job.title, "applied move");
        Ok(Some(job))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Accept a stored job against the caller's current text for the file.
    ///
    /// The fingerprint is re-validated: if the declarations in
    /// `current_text` no longer match the set the job was computed from,
    /// the accept fails with a stale-job error and the caller should wait
    /// for the next advisory run. On success the job is retired and
    /// returned; its `text` and `position` are the replacement to apply.
    pub fn accept(&mut self, id: &JobId, current_text: &str) -> Result<Job, NudgeError> {
        let job = self
            .store
            .get(id)
            .ok_or_else(|| NudgeError::job_not_found(id.to_string()))?;

        let extractor = extractor_for(&job.file)?;
        let extraction = extractor.extract(current_text);
        let current = Fingerprint::of_declarations(&extraction.declarations);
        if job.is_stale(&current) {
            return Err(NudgeError::stale_job(id.to_string()));
        }

        // Fresh: safe to retire and hand out.
        let job = self
            .store
            .remove(id)
            .ok_or_else(|| NudgeError::job_not_found(id.to_string()))?;
        info!(file = %job.file, job = %job.id, "accepted move");
        Ok(job)
    }

    /// Reject a stored job: retire it untouched.
    pub fn reject(&mut self, id: &JobId) -> Result<Job, NudgeError> {
        let job = self
            .store
            .remove(id)
            .ok_or_else(|| NudgeError::job_not_found(id.to_string()))?;
        info!(file = %job.file, job = %job.id, "rejected move");
        Ok(job)
    }

    // ------------------------------------------------------------------
    // Scan
    // ------------------------------------------------------------------

    /// Walk `root` and advise every TypeScript/JavaScript source file.
    ///
    /// `node_modules` and dot-directories are skipped; `include` globs
    /// (matched against the path relative to `root`) narrow the set
    /// further. Files that fail to read or advise are logged and skipped,
    /// never fatal.
    pub fn scan(&mut self, root: &Path, include: &[String]) -> Result<ScanOutcome, NudgeError> {
        let include_set = build_include_set(include)?;
        let mut outcome = ScanOutcome::default();

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_ignored(entry))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "walk error, skipping");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if SourceFlavor::from_path(path).is_none() {
                continue;
            }
            if let Some(set) = &include_set {
                let relative = path.strip_prefix(root).unwrap_or(path);
                if !set.is_match(relative) {
                    continue;
                }
            }

            outcome.files_scanned += 1;
            let path_str = path.to_string_lossy().to_string();
            match self.propose_file(&path_str, Position::default()) {
                Ok(Some(job)) => outcome.jobs.push(job),
                Ok(None) => {}
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping file");
                }
            }
        }

        info!(
            root = %root.display(),
            files = outcome.files_scanned,
            jobs = outcome.jobs.len(),
            "scan finished"
        );
        Ok(outcome)
    }
}

/// What a scan produced: how many source files were advised and the
/// improving proposals, in walk order (sorted by file name).
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files_scanned: u32,
    pub jobs: Vec<Job>,
}

// ============================================================================
// Helpers
// ============================================================================

fn extractor_for(path: &str) -> Result<TypeScriptExtractor, NudgeError> {
    let flavor = SourceFlavor::from_path(Path::new(path)).ok_or_else(|| {
        NudgeError::invalid_args(format!("unsupported file extension: {}", path))
    })?;
    Ok(TypeScriptExtractor::new(flavor))
}

fn read_file(path: &str) -> Result<String, NudgeError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(NudgeError::file_not_found(path))
        }
        Err(err) => Err(NudgeError::from(err)),
    }
}

/// Stage the new content in a temp file next to the target, then rename it
/// over the original. A crash mid-write leaves the original intact.
fn write_atomic(path: &str, text: &str) -> Result<(), NudgeError> {
    let target = Path::new(path);
    let dir = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir)
        .map_err(|err| stage_error(path, "failed to stage write", err))?;
    staged
        .write_all(text.as_bytes())
        .map_err(|err| stage_error(path, "failed to write staged content", err))?;
    staged
        .persist(target)
        .map_err(|err| stage_error(path, "failed to replace file", err))?;
    Ok(())
}

fn stage_error(path: &str, what: &str, err: impl std::fmt::Display) -> NudgeError {
    NudgeError::apply(format!("{}: {}", what, err), Some(path.to_string()))
}

fn build_include_set(include: &[String]) -> Result<Option<GlobSet>, NudgeError> {
    if include.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in include {
        let glob = Glob::new(pattern).map_err(|err| {
            NudgeError::invalid_args(format!("invalid include glob '{}': {}", pattern, err))
        })?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|err| NudgeError::invalid_args(err.to_string()))?;
    Ok(Some(set))
}

/// Subtrees the scan never descends into.
fn is_ignored(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_str().unwrap_or("");
    name == "node_modules" || name.starts_with('.')
}

// ============================================================================
// Tests
// ============================================================================
