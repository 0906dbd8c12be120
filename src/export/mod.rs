//! Export orchestration: manifest, discovery, joining, muxing, cleanup.

mod output;

pub use output::{default_file_name, resolve_output_path};

use crate::config::ExportConfig;
use anyhow::{Context, Result};
use clipexport_av::Muxer;
use clipexport_dash::{
    discover_all, manifest, DirectorySource, JoinOutcome, JoinProgress, JoinReport, Joiner,
    Representation,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Preconditions that stop an export before any chunk is touched.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("input directory not found or not a directory: {}", dir.display())]
    InputNotDirectory { dir: PathBuf },

    #[error("'{manifest}' not found in the input directory: {}", dir.display())]
    ManifestNotFound { manifest: String, dir: PathBuf },

    #[error("no stream could be joined, nothing to mux")]
    NothingJoined,
}

/// Receives progress notifications during an export.
pub trait ExportObserver: Send + Sync {
    fn on_join_progress(&self, _progress: &JoinProgress) {}

    fn on_mux_started(&self, _inputs: &[PathBuf], _output: &Path) {}

    fn on_mux_finished(&self, _output: &Path, _success: bool) {}
}

/// Observer that ignores every notification.
pub struct NoopObserver;

impl ExportObserver for NoopObserver {}

/// One export run.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Clip directory holding the manifest and chunk files.
    pub input_dir: PathBuf,
    /// Output file or directory; see [`resolve_output_path`].
    pub output: Option<PathBuf>,
}

impl ExportRequest {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Representations with their discovered ranges and where the result goes.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportPlan {
    pub input_dir: PathBuf,
    pub manifest: PathBuf,
    pub output: PathBuf,
    pub representations: Vec<Representation>,
}

/// What a completed export produced.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub streams: Vec<JoinReport>,
}

/// Drives an export end to end.
pub struct Exporter {
    config: ExportConfig,
    observer: Arc<dyn ExportObserver>,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExportObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Parse the manifest and discover segment ranges without writing anything.
    pub fn plan(&self, request: &ExportRequest) -> Result<ExportPlan> {
        let input_dir = &request.input_dir;
        if !input_dir.is_dir() {
            return Err(ExportError::InputNotDirectory {
                dir: input_dir.clone(),
            }
            .into());
        }

        let manifest_path = input_dir.join(&self.config.manifest_name);
        if !manifest_path.is_file() {
            return Err(ExportError::ManifestNotFound {
                manifest: self.config.manifest_name.clone(),
                dir: input_dir.clone(),
            }
            .into());
        }

        let output = resolve_output_path(
            input_dir,
            request.output.as_deref(),
            &self.config.output_extension,
        )?;

        tracing::info!("Reading manifest {:?}", manifest_path);
        let representations = manifest::parse_file(&manifest_path)
            .with_context(|| format!("Failed to parse manifest: {:?}", manifest_path))?;
        tracing::info!("Manifest lists {} representation(s)", representations.len());

        let representations = discover_all(
            representations,
            &DirectorySource::new(input_dir),
            self.config.missing_init_policy(),
        )?;

        Ok(ExportPlan {
            input_dir: input_dir.clone(),
            manifest: manifest_path,
            output,
            representations,
        })
    }

    /// Plan and run the export.
    pub fn run(&self, request: &ExportRequest, muxer: &dyn Muxer) -> Result<ExportSummary> {
        let plan = self.plan(request)?;
        self.execute(plan, muxer)
    }

    /// Join and mux a plan.
    ///
    /// Intermediate stream files are removed whether or not muxing succeeds,
    /// except in compact mode after a failure: the chunks are gone by then and
    /// the stream files are the only copy of the recording left.
    pub fn execute(&self, plan: ExportPlan, muxer: &dyn Muxer) -> Result<ExportSummary> {
        let observer = Arc::clone(&self.observer);
        let joiner = Joiner::new(&plan.input_dir, self.config.join_options())
            .with_progress_callback(Box::new(move |p: &JoinProgress| {
                observer.on_join_progress(p)
            }));

        let result = self.join_and_mux(&joiner, &plan, muxer);
        if result.is_err() && self.config.compact {
            tracing::warn!(
                "Export failed in compact mode, keeping intermediate stream files in {:?}",
                plan.input_dir
            );
        } else {
            self.cleanup(&joiner, &plan.representations);
        }
        let streams = result?;

        tracing::info!("Video exported successfully: {:?}", plan.output);

        Ok(ExportSummary {
            output: plan.output,
            streams,
        })
    }

    fn join_and_mux(
        &self,
        joiner: &Joiner,
        plan: &ExportPlan,
        muxer: &dyn Muxer,
    ) -> Result<Vec<JoinReport>> {
        let streams: Vec<JoinReport> = joiner
            .join_all(&plan.representations)?
            .into_iter()
            .filter_map(|outcome| match outcome {
                JoinOutcome::Joined(report) => Some(report),
                JoinOutcome::Skipped { .. } => None,
            })
            .collect();

        if streams.is_empty() {
            return Err(ExportError::NothingJoined.into());
        }

        let inputs: Vec<PathBuf> = streams.iter().map(|s| s.path.clone()).collect();

        tracing::info!(
            "Merging {} stream(s) into {:?}",
            inputs.len(),
            plan.output
        );
        self.observer.on_mux_started(&inputs, &plan.output);

        let muxed = muxer.mux(&inputs, &plan.output);
        self.observer.on_mux_finished(&plan.output, muxed.is_ok());
        muxed.with_context(|| format!("Failed to write {:?}", plan.output))?;

        Ok(streams)
    }

    /// Remove every intermediate stream file of this run.
    fn cleanup(&self, joiner: &Joiner, representations: &[Representation]) {
        for rep in representations {
            let path = match joiner.stream_path(rep.id) {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Cannot name stream file of '{}': {}", rep.id, e);
                    continue;
                }
            };

            if path.exists() {
                match std::fs::remove_file(&path) {
                    Ok(()) => tracing::debug!("Removed intermediate stream {:?}", path),
                    Err(e) => tracing::warn!("Failed to remove {:?}: {}", path, e),
                }
            }
        }
    }
}
