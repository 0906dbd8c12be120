//! Container assembly from per-track elementary streams.

use crate::{tools, Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Combines one or more stream files into a single output container.
///
/// Inputs are handed over in track order; implementations must keep that
/// order in the output.
pub trait Muxer {
    /// Mux `inputs` into `output`, overwriting it if present.
    fn mux(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;
}

/// Muxer backed by the ffmpeg CLI in stream copy mode.
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    program: PathBuf,
}

impl FfmpegMuxer {
    /// Use the given ffmpeg executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate ffmpeg, preferring a configured path over PATH lookup.
    pub fn locate(config_path: Option<&Path>) -> Result<Self> {
        tools::get_tool_path("ffmpeg", config_path).map(Self::new)
    }

    /// Path to the ffmpeg executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Muxer for FfmpegMuxer {
    fn mux(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        if inputs.is_empty() {
            return Err(Error::InvalidInput("no input streams to mux".to_string()));
        }

        if let Some(missing) = inputs.iter().find(|p| !p.exists()) {
            return Err(Error::input_not_found(missing));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Muxing {} stream(s) with {:?} -> {:?}",
            inputs.len(),
            self.program,
            output
        );

        let result = Command::new(&self.program)
            .args(ffmpeg_args(inputs, output))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found("ffmpeg")
                } else {
                    Error::Io(e)
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::tool_failed("ffmpeg", stderr.trim().to_string()));
        }

        if !output.exists() {
            return Err(Error::tool_failed(
                "ffmpeg",
                format!("exited successfully but {:?} was not created", output),
            ));
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Mux complete: {:?}", output);

        Ok(())
    }
}

/// Build the ffmpeg argument list for a stream copy mux.
///
/// Every input is mapped explicitly so that all of its tracks are kept, in
/// input order.
pub fn ffmpeg_args(inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-y".into()];

    for input in inputs {
        args.push("-i".into());
        args.push(input.as_os_str().to_owned());
    }

    for index in 0..inputs.len() {
        args.push("-map".into());
        args.push(index.to_string().into());
    }

    args.push("-c".into());
    args.push("copy".into());
    args.push(output.as_os_str().to_owned());

    args
}
