//! Batch analysis of a run directory
//!
//! `RunAnalyzer` walks the eligible files of one burn-in run, serves each
//! file from the per-fingerprint cache when the entry is newer than the
//! source, recomputes it otherwise, and folds the per-file results into a
//! [`RunResult`].

use crate::alert::Severity;
use crate::cache::{CacheStore, Memo, MemoKey};
use crate::error::{AnalysisError, Result};
use crate::hyperparams::{Fingerprint, Hyperparameters};
use crate::ingest::{CsvSeriesLoader, SeriesLoader};
use crate::pipeline::{FileAnalysis, Pipeline};
use crate::series::{Mode, TimeWindow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Where results are cached and which files of a run are analyzed
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Root directory of the persistent cache
    pub cache_root: PathBuf,
    /// Substring a file name must contain to be analyzed
    pub file_marker: String,
    /// Mode assigned to samples of files without a mode column
    pub default_mode: Mode,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from(".bandwatch-cache"),
            file_marker: "HTOL".to_string(),
            default_mode: Mode::Run,
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = root.into();
        self
    }

    pub fn with_file_marker(mut self, marker: impl Into<String>) -> Self {
        self.file_marker = marker.into();
        self
    }

    pub fn with_default_mode(mut self, mode: Mode) -> Self {
        self.default_mode = mode;
        self
    }
}

/// Receives `(fraction_complete, label)` after each processed file
pub trait ProgressObserver {
    fn on_progress(&mut self, fraction: f64, label: &str);
}

/// Discards progress notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _fraction: f64, _label: &str) {}
}

impl<F: FnMut(f64, &str)> ProgressObserver for F {
    fn on_progress(&mut self, fraction: f64, label: &str) {
        self(fraction, label)
    }
}

/// Aggregated result of one run directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Grouped alert counts; every severity is present, possibly zero
    pub alert_counts: BTreeMap<Severity, usize>,
    /// Per-file results keyed by file name; skipped files are absent
    pub alert_data: BTreeMap<String, FileAnalysis>,
}

impl Default for RunResult {
    fn default() -> Self {
        Self {
            alert_counts: Severity::ALL.iter().map(|&s| (s, 0)).collect(),
            alert_data: BTreeMap::new(),
        }
    }
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_alerts(&self) -> usize {
        self.alert_counts.values().sum()
    }

    fn add_file(&mut self, file_name: String, analysis: FileAnalysis) {
        for (severity, count) in analysis.counts() {
            *self.alert_counts.entry(severity).or_insert(0) += count;
        }
        self.alert_data.insert(file_name, analysis);
    }
}

/// Whether a file result was served from the cache or recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Computed,
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub file_name: String,
    pub analysis: FileAnalysis,
    pub origin: Origin,
}

/// Per-invocation state shared by every file of a run
struct RunContext<'a> {
    run_name: String,
    fingerprint: Fingerprint,
    pipeline: Pipeline,
    params: &'a Hyperparameters,
}

impl<'a> RunContext<'a> {
    fn new(run_dir: &Path, params: &'a Hyperparameters, default_mode: Mode) -> Result<Self> {
        Ok(Self {
            run_name: run_name(run_dir),
            fingerprint: params.namespace(default_mode)?,
            pipeline: Pipeline::new(params)?,
            params,
        })
    }
}

/// Cache namespace segment of a run directory: its final path component
fn run_name(run_dir: &Path) -> String {
    if let Some(name) = run_dir.file_name() {
        return name.to_string_lossy().into_owned();
    }
    // "." and ".." have no final component until resolved
    run_dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "run".to_string())
}

/// Analyzes run directories with a loader and a persistent cache
#[derive(Debug)]
pub struct RunAnalyzer<L = CsvSeriesLoader> {
    loader: L,
    config: AnalyzerConfig,
    store: CacheStore,
    memo: Memo<RunResult>,
}

impl RunAnalyzer<CsvSeriesLoader> {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_loader(config, CsvSeriesLoader::default())
    }
}

impl<L: SeriesLoader> RunAnalyzer<L> {
    pub fn with_loader(config: AnalyzerConfig, loader: L) -> Self {
        Self {
            store: CacheStore::new(config.cache_root.clone()),
            loader,
            config,
            memo: Memo::new(),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Cache namespace used for `params` under this analyzer's default mode
    pub fn cache_fingerprint(&self, params: &Hyperparameters) -> Result<Fingerprint> {
        Ok(params.namespace(self.config.default_mode)?)
    }

    /// Eligible files of a run directory, sorted by name
    pub fn eligible_files(&self, run_dir: &Path) -> Result<Vec<PathBuf>> {
        let io_err = |source| AnalysisError::Io {
            path: run_dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(run_dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_file() {
                continue;
            }
            if entry
                .file_name()
                .to_string_lossy()
                .contains(self.config.file_marker.as_str())
            {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Analyze one file, using the cache namespace of its parent directory.
    ///
    /// Returns `Ok(None)` when the file is skipped (missing channel,
    /// unreadable or malformed content); only configuration errors are
    /// returned as `Err`.
    pub fn process_file(&self, path: &Path, params: &Hyperparameters) -> Result<Option<FileOutcome>> {
        let run_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let ctx = RunContext::new(run_dir, params, self.config.default_mode)?;
        Ok(self.process_file_in(&ctx, path))
    }

    fn process_file_in(&self, ctx: &RunContext<'_>, path: &Path) -> Option<FileOutcome> {
        let file_name = path.file_name()?.to_string_lossy().into_owned();

        let source_modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                return None;
            }
        };

        match self
            .store
            .load(&ctx.run_name, &ctx.fingerprint, &file_name, source_modified)
        {
            Ok(analysis) => {
                tracing::debug!(file = %file_name, fingerprint = %ctx.fingerprint, "cache hit");
                return Some(FileOutcome {
                    file_name,
                    analysis,
                    origin: Origin::Cache,
                });
            }
            Err(e) => {
                tracing::debug!(file = %file_name, reason = %e, "cache miss");
            }
        }

        let series = match self.loader.load(
            path,
            &ctx.params.selected_variable,
            self.config.default_mode,
        ) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "skipping file");
                return None;
            }
        };

        let analysis = ctx.pipeline.analyze(series);
        if let Err(e) = self
            .store
            .store(&ctx.run_name, &ctx.fingerprint, &file_name, &analysis)
        {
            tracing::warn!(file = %file_name, error = %e, "failed to write cache entry");
        }

        Some(FileOutcome {
            file_name,
            analysis,
            origin: Origin::Computed,
        })
    }

    /// Analyze every eligible file of `run_dir`.
    ///
    /// Configuration errors abort before any file is read. Skipped files are
    /// left out of `alert_data` and of the progress denominator. When a
    /// window is given, each file is restricted to it after grouping.
    pub fn process_htol_run(
        &self,
        run_dir: &Path,
        params: &Hyperparameters,
        window: Option<&TimeWindow>,
        progress: &mut dyn ProgressObserver,
    ) -> Result<RunResult> {
        let ctx = RunContext::new(run_dir, params, self.config.default_mode)?;
        let files = self.eligible_files(run_dir)?;

        tracing::info!(
            run = %ctx.run_name,
            fingerprint = %ctx.fingerprint,
            files = files.len(),
            "analyzing run"
        );

        let mut result = RunResult::new();
        let mut total = files.len();
        let mut processed = 0usize;
        let mut from_cache = 0usize;

        for path in &files {
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match self.process_file_in(&ctx, path) {
                Some(outcome) => {
                    processed += 1;
                    if outcome.origin == Origin::Cache {
                        from_cache += 1;
                    }
                    let analysis = match window {
                        Some(w) => outcome.analysis.restrict(w),
                        None => outcome.analysis,
                    };
                    result.add_file(outcome.file_name, analysis);
                }
                None => total -= 1,
            }

            let fraction = if total == 0 {
                1.0
            } else {
                (processed as f64 / total as f64).min(1.0)
            };
            progress.on_progress(fraction, &label);
        }

        tracing::info!(
            run = %ctx.run_name,
            processed,
            skipped = files.len() - processed,
            from_cache,
            alerts = result.total_alerts(),
            "run analyzed"
        );
        Ok(result)
    }

    /// [`process_htol_run`](Self::process_htol_run) memoized per
    /// `(run directory, cache namespace, window)` for the analyzer's lifetime.
    pub fn analyze_memoized(
        &mut self,
        run_dir: &Path,
        params: &Hyperparameters,
        window: Option<TimeWindow>,
        progress: &mut dyn ProgressObserver,
    ) -> Result<RunResult> {
        let key = MemoKey::new(
            "process_htol_run",
            &(run_dir.to_string_lossy(), self.cache_fingerprint(params)?, window),
        )?;

        let mut memo = std::mem::take(&mut self.memo);
        let result = memo.get_or_try_insert_with(key, || {
            self.process_htol_run(run_dir, params, window.as_ref(), progress)
        });
        self.memo = memo;
        result
    }

    /// Forget memoized run results; persisted cache entries are untouched
    pub fn invalidate_memo(&mut self) {
        self.memo.clear();
    }

    pub fn memo_stats(&self) -> (u64, u64) {
        self.memo.stats()
    }
}
