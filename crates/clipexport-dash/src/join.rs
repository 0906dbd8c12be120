//! Stream joining.
//!
//! Each representation becomes one intermediate stream file: the init chunk
//! followed by every media segment of its range in ascending order. Any
//! reordering corrupts the stream, so segments are never sorted or batched.

use crate::representation::Representation;
use crate::template::{resolve, Bindings};
use crate::{Error, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default name of the per-representation stream file.
pub const DEFAULT_STREAM_TEMPLATE: &str = "stream-$RepresentationID$.m4s";

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(&JoinProgress) + Send + Sync>;

/// Options controlling how streams are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOptions {
    /// Delete every chunk as soon as its bytes are in the stream file.
    pub compact: bool,
    /// Name of the stream file, resolved with `RepresentationID`.
    pub stream_template: String,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            compact: false,
            stream_template: DEFAULT_STREAM_TEMPLATE.to_string(),
        }
    }
}

/// Progress of one representation, reported after each chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinProgress {
    pub id: u32,
    /// Chunks handled so far, init chunk included.
    pub done: u64,
    /// Init chunk plus every segment of the range.
    pub total: u64,
}

/// Result of joining one representation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct JoinReport {
    pub id: u32,
    pub path: PathBuf,
    pub segments_written: u64,
    pub segments_missing: u64,
    pub bytes_written: u64,
}

/// Why a representation produced no stream file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Discovery never ran for it.
    NoSegmentRange,
    /// The init chunk vanished before joining.
    MissingInit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(JoinReport),
    Skipped { id: u32, reason: SkipReason },
}

impl JoinOutcome {
    pub fn report(&self) -> Option<&JoinReport> {
        match self {
            JoinOutcome::Joined(report) => Some(report),
            JoinOutcome::Skipped { .. } => None,
        }
    }
}

/// Concatenates chunk files from one input directory.
pub struct Joiner {
    input_dir: PathBuf,
    options: JoinOptions,
    progress_callback: Option<ProgressCallback>,
}

impl Joiner {
    pub fn new(input_dir: impl Into<PathBuf>, options: JoinOptions) -> Self {
        Self {
            input_dir: input_dir.into(),
            options,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn options(&self) -> &JoinOptions {
        &self.options
    }

    /// Path of the stream file for representation `id`.
    pub fn stream_path(&self, id: u32) -> Result<PathBuf> {
        let name = resolve(&self.options.stream_template, &Bindings::for_representation(id))?;
        Ok(self.input_dir.join(name))
    }

    fn report_progress(&self, progress: JoinProgress) {
        if let Some(ref cb) = self.progress_callback {
            cb(&progress);
        }
        tracing::trace!(
            "Representation {}: {}/{} chunks",
            progress.id,
            progress.done,
            progress.total
        );
    }

    /// Join one representation into its stream file.
    pub fn join(&self, rep: &Representation) -> Result<JoinOutcome> {
        let Some(range) = rep.segments else {
            tracing::warn!(
                "No segment data found for representation '{}', skipping it",
                rep.id
            );
            return Ok(JoinOutcome::Skipped {
                id: rep.id,
                reason: SkipReason::NoSegmentRange,
            });
        };

        let init_path = self.input_dir.join(rep.init_filename()?);
        let mut init = match File::open(&init_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Initialization chunk {:?} disappeared for representation '{}', skipping it",
                    init_path,
                    rep.id
                );
                return Ok(JoinOutcome::Skipped {
                    id: rep.id,
                    reason: SkipReason::MissingInit,
                });
            }
            Err(e) => return Err(Error::io(&init_path, e)),
        };

        let path = self.stream_path(rep.id)?;
        let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
        let mut stream = BufWriter::new(file);

        let total = range.len() + 1;
        let mut report = JoinReport {
            id: rep.id,
            path: path.clone(),
            segments_written: 0,
            segments_missing: 0,
            bytes_written: 0,
        };

        tracing::info!(
            "Joining {} segment(s) for representation {} into {:?}",
            range.len(),
            rep.describe(),
            path
        );

        report.bytes_written += self.append(&mut init, &init_path, &mut stream, &path)?;
        drop(init);
        self.consume(&init_path, &stream)?;
        self.report_progress(JoinProgress {
            id: rep.id,
            done: 1,
            total,
        });

        for (index, number) in range.numbers().enumerate() {
            let chunk_path = self.input_dir.join(rep.segment_filename(number)?);

            match File::open(&chunk_path) {
                Ok(mut chunk) => {
                    report.bytes_written +=
                        self.append(&mut chunk, &chunk_path, &mut stream, &path)?;
                    drop(chunk);
                    self.consume(&chunk_path, &stream)?;
                    report.segments_written += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::warn!(
                        "Segment {} of representation '{}' ({:?}) is missing, skipping it",
                        number,
                        rep.id,
                        chunk_path
                    );
                    report.segments_missing += 1;
                }
                Err(e) => return Err(Error::io(&chunk_path, e)),
            }

            self.report_progress(JoinProgress {
                id: rep.id,
                done: index as u64 + 2,
                total,
            });
        }

        stream.flush().map_err(|e| Error::io(&path, e))?;

        tracing::debug!(
            "Wrote {} bytes for representation '{}' ({} segments, {} missing)",
            report.bytes_written,
            rep.id,
            report.segments_written,
            report.segments_missing
        );

        Ok(JoinOutcome::Joined(report))
    }

    /// Join every representation, in order.
    pub fn join_all(&self, representations: &[Representation]) -> Result<Vec<JoinOutcome>> {
        representations.iter().map(|rep| self.join(rep)).collect()
    }

    fn append(
        &self,
        chunk: &mut File,
        chunk_path: &Path,
        stream: &mut BufWriter<File>,
        stream_path: &Path,
    ) -> Result<u64> {
        let copied = io::copy(chunk, stream).map_err(|e| Error::io(chunk_path, e))?;
        stream.flush().map_err(|e| Error::io(stream_path, e))?;
        Ok(copied)
    }

    /// In compact mode, delete a chunk whose bytes are flushed to `stream`.
    fn consume(&self, chunk_path: &Path, stream: &BufWriter<File>) -> Result<()> {
        if !self.options.compact {
            return Ok(());
        }

        stream
            .get_ref()
            .sync_data()
            .map_err(|e| Error::io(chunk_path, e))?;

        if let Err(e) = std::fs::remove_file(chunk_path) {
            tracing::warn!("Failed to remove consumed chunk {:?}: {}", chunk_path, e);
        }

        Ok(())
    }
}
