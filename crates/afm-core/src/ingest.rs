//! Parallel batch ingestion of instrument files
//!
//! The core never performs I/O itself; this module is the boundary where
//! files are opened and handed to a format-specific [`SourceReader`]. Files
//! are split into contiguous runs, one per worker, and decoded
//! independently. A file that cannot be read is recorded and skipped, an
//! out-of-memory condition aborts the whole batch.

use crate::error::{AfmError, Result};
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tracing::{debug, error, info, instrument, warn};

/// Upper bound on the worker pool size
pub const DEFAULT_MAX_WORKERS: usize = 8;

// ============================================================================
// Failures
// ============================================================================

/// What went wrong with a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The file could not be decoded as an image
    IllegalImage,
    /// The file could not be decoded as a spectroscopy source
    IllegalSpectroscopy,
    /// Memory exhaustion; aborts the batch
    Fatal,
}

/// Error returned by a [`SourceReader`] for one file
#[derive(Debug)]
pub struct ReadFailure {
    pub kind: FailureKind,
    pub error: AfmError,
}

impl ReadFailure {
    /// Kind the batch acts on: memory exhaustion aborts the batch however
    /// the reader classified it.
    pub fn effective_kind(&self) -> FailureKind {
        match self.error {
            AfmError::OutOfMemory { .. } => FailureKind::Fatal,
            _ => self.kind,
        }
    }

    pub fn illegal_image(error: AfmError) -> Self {
        Self {
            kind: FailureKind::IllegalImage,
            error,
        }
    }

    pub fn illegal_spectroscopy(error: AfmError) -> Self {
        Self {
            kind: FailureKind::IllegalSpectroscopy,
            error,
        }
    }

    pub fn fatal(error: AfmError) -> Self {
        Self {
            kind: FailureKind::Fatal,
            error,
        }
    }
}

/// A file the batch had to skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Decodes one file into zero or more sources.
///
/// Implementations are shared by all workers.
pub trait SourceReader: Sync {
    type Source: Send;

    fn read(&self, path: &Path) -> std::result::Result<Vec<Self::Source>, ReadFailure>;
}

// ============================================================================
// Configuration, cancellation and progress
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    pub max_workers: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl IngestConfig {
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// `min(available parallelism, max_workers)`, at least 1
    pub fn worker_count(&self) -> usize {
        let available = thread::available_parallelism().map_or(1, |n| n.get());
        available.min(self.max_workers).max(1)
    }
}

/// Cooperative cancellation flag, checked between files
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Files processed so far, successful or not
#[derive(Debug, Clone)]
pub struct Progress {
    processed: Arc<AtomicUsize>,
    total: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            processed: Arc::new(AtomicUsize::new(0)),
            total,
        }
    }

    fn reset(&self) {
        self.processed.store(0, Ordering::SeqCst);
    }

    fn advance(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Completion in percent; an empty batch is complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        100.0 * self.processed() as f64 / self.total as f64
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Everything a batch produced
#[derive(Debug)]
pub struct BatchOutcome<S> {
    /// Decoded sources in file order
    pub sources: Vec<S>,
    pub illegal_images: Vec<FailedFile>,
    pub illegal_spectroscopy: Vec<FailedFile>,
    /// True if the batch stopped early on request
    pub cancelled: bool,
}

impl<S> BatchOutcome<S> {
    pub fn failure_count(&self) -> usize {
        self.illegal_images.len() + self.illegal_spectroscopy.len()
    }
}

/// A list of files to decode with a shared worker pool
#[derive(Debug)]
pub struct BatchIngest {
    files: Vec<PathBuf>,
    config: IngestConfig,
    cancellation: CancellationToken,
    progress: Progress,
}

/// Append-only failure lists shared by the workers
#[derive(Default)]
struct FailureLog {
    illegal_images: Mutex<Vec<FailedFile>>,
    illegal_spectroscopy: Mutex<Vec<FailedFile>>,
    fatal: Mutex<Option<FailedFile>>,
    aborted: AtomicBool,
}

impl FailureLog {
    fn record(&self, path: &Path, failure: ReadFailure) {
        let kind = failure.effective_kind();
        let entry = FailedFile {
            path: path.to_path_buf(),
            kind,
            message: failure.error.to_string(),
        };
        match kind {
            FailureKind::IllegalImage => {
                warn!(path = %path.display(), error = %failure.error, "illegal image");
                push(&self.illegal_images, entry);
            }
            FailureKind::IllegalSpectroscopy => {
                warn!(
                    path = %path.display(),
                    error = %failure.error,
                    "illegal spectroscopy source"
                );
                push(&self.illegal_spectroscopy, entry);
            }
            FailureKind::Fatal => {
                error!(
                    path = %path.display(),
                    error = %failure.error,
                    "fatal failure, aborting batch"
                );
                self.aborted.store(true, Ordering::SeqCst);
                let mut fatal = self.fatal.lock().unwrap_or_else(PoisonError::into_inner);
                fatal.get_or_insert(entry);
            }
        }
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

fn push(list: &Mutex<Vec<FailedFile>>, entry: FailedFile) {
    list.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
}

fn take(list: Mutex<Vec<FailedFile>>) -> Vec<FailedFile> {
    list.into_inner().unwrap_or_else(PoisonError::into_inner)
}

impl BatchIngest {
    pub fn new(files: Vec<PathBuf>, config: IngestConfig) -> Self {
        let progress = Progress::new(files.len());
        Self {
            files,
            config,
            cancellation: CancellationToken::new(),
            progress,
        }
    }

    /// Token that stops the batch after the files currently being read
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    /// Decode every file with `reader`.
    ///
    /// Per-file failures are collected in the outcome. A
    /// [`FailureKind::Fatal`] failure stops all workers and the batch returns
    /// [`AfmError::OutOfMemory`] without partial results. A failure carrying
    /// [`AfmError::OutOfMemory`] counts as fatal whatever its kind.
    ///
    /// Progress restarts from zero on every call.
    #[instrument(skip_all, fields(files = self.files.len()))]
    pub fn run<R: SourceReader>(&self, reader: &R) -> Result<BatchOutcome<R::Source>> {
        let n = self.files.len();
        let workers = self.config.worker_count().min(n.max(1));
        let chunk_size = n.div_ceil(workers).max(1);
        info!(workers, chunk_size, "starting batch ingestion");
        self.progress.reset();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("afm-ingest-{i}"))
            .build()
            .map_err(|e| AfmError::Io(std::io::Error::other(e)))?;

        let log = FailureLog::default();
        let chunks: Vec<Vec<R::Source>> = pool.install(|| {
            self.files
                .par_chunks(chunk_size)
                .map(|chunk| self.read_chunk(chunk, reader, &log))
                .collect()
        });

        if let Some(fatal) = log.fatal.into_inner().unwrap_or_else(PoisonError::into_inner) {
            return Err(AfmError::OutOfMemory {
                context: format!("reading {}: {}", fatal.path.display(), fatal.message),
            });
        }

        let outcome = BatchOutcome {
            sources: chunks.into_iter().flatten().collect(),
            illegal_images: take(log.illegal_images),
            illegal_spectroscopy: take(log.illegal_spectroscopy),
            cancelled: self.cancellation.is_cancelled(),
        };
        info!(
            sources = outcome.sources.len(),
            failures = outcome.failure_count(),
            cancelled = outcome.cancelled,
            "batch ingestion finished"
        );
        Ok(outcome)
    }

    fn read_chunk<R: SourceReader>(
        &self,
        chunk: &[PathBuf],
        reader: &R,
        log: &FailureLog,
    ) -> Vec<R::Source> {
        let mut sources = Vec::new();
        for path in chunk {
            if self.cancellation.is_cancelled() || log.is_aborted() {
                debug!(path = %path.display(), "skipping file after stop request");
                break;
            }
            match reader.read(path) {
                Ok(decoded) => sources.extend(decoded),
                Err(failure) => log.record(path, failure),
            }
            self.progress.advance();
        }
        sources
    }
}

/// Memory-map `path` read-only for a reader to wrap in a
/// [`ByteBuffer`](crate::ByteBuffer).
#[instrument]
pub fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    // SAFETY: read-only mapping; callers must not modify the file while the
    // map is alive.
    let mmap = unsafe { Mmap::map(&file)? };
    debug!(bytes = mmap.len(), "file mapped");
    Ok(mmap)
}
