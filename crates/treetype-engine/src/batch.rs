//! # Batch Encoding
//!
//! Runs the single-file pipeline over many inputs. Files are independent, so
//! the batch is a plain parallel map: inputs are dealt out to scoped worker
//! threads and the results come back in input order. A failing file never
//! stops the others.

use std::num::NonZeroUsize;
use std::panic;
use std::path::PathBuf;
use std::thread;

use crate::document::{EncodeError, EncodeOptions, encode_source};
use crate::io::{
    DEFAULT_OUTPUT_ROOT, IoError, SourceLimits, default_output_path, load_source, write_document,
};
use crate::language::Language;

/// One input and, optionally, where its document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    /// Overrides the `<output_root>/<language>/<stem>.json` convention.
    pub output: Option<PathBuf>,
}

impl BatchJob {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        BatchJob {
            input: input.into(),
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub encode: EncodeOptions,
    pub limits: SourceLimits,
    pub output_root: PathBuf,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            encode: EncodeOptions::default(),
            limits: SourceLimits::default(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
        }
    }
}

/// Summary of one successfully written document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub language: Language,
    pub total_lines: usize,
    pub typeable_chars: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("{path}: {source}")]
    Encode {
        path: PathBuf,
        source: EncodeError,
    },
}

pub type FileResult = Result<FileReport, FileError>;

/// Loads, encodes and writes one file.
pub fn process_file(job: &BatchJob, options: &ProcessOptions) -> FileResult {
    let source = load_source(&job.input, &options.limits)?;
    log::info!(
        "encoding {} as {} ({} lines)",
        source.path.display(),
        source.language,
        source.line_count()
    );

    let encoded = encode_source(source.language, &source.text, &options.encode).map_err(|err| {
        FileError::Encode {
            path: job.input.clone(),
            source: err,
        }
    })?;

    let output = match &job.output {
        Some(path) => path.clone(),
        None => default_output_path(&options.output_root, &job.input, source.language),
    };
    write_document(&encoded.document, &output)?;

    Ok(FileReport {
        input: job.input.clone(),
        output,
        language: source.language,
        total_lines: encoded.document.total_lines,
        typeable_chars: encoded.document.typeable_chars(),
    })
}

/// Default worker count: the machine's available parallelism.
pub fn default_jobs() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Processes every job, with at most `jobs` files in flight. Results are in
/// the same order as `batch`.
pub fn run_batch(batch: &[BatchJob], options: &ProcessOptions, jobs: usize) -> Vec<FileResult> {
    if batch.is_empty() {
        return Vec::new();
    }
    let workers = jobs.clamp(1, batch.len());
    if workers == 1 {
        return batch.iter().map(|job| process_file(job, options)).collect();
    }

    let chunk_size = batch.len().div_ceil(workers);
    log::debug!("{} files across {workers} workers", batch.len());

    thread::scope(|scope| {
        let handles: Vec<_> = batch
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|job| process_file(job, options))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        // Built binaries abort on panic; test builds unwind, and a worker's
        // panic is re-raised on the calling thread.
        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
            .collect()
    })
}
