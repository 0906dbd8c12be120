use clipexport_dash::{JoinOptions, MissingInitPolicy, DEFAULT_STREAM_TEMPLATE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Manifest file name inside the input directory
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Intermediate stream file name, must reference $RepresentationID$
    #[serde(default = "default_stream_template")]
    pub stream_template: String,

    /// Extension of the default output file
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Delete chunks as soon as they are joined
    #[serde(default)]
    pub compact: bool,

    /// Leave out representations without an init chunk instead of failing
    #[serde(default)]
    pub skip_missing_init: bool,
}

fn default_manifest_name() -> String {
    "session.mpd".to_string()
}

fn default_stream_template() -> String {
    DEFAULT_STREAM_TEMPLATE.to_string()
}

fn default_output_extension() -> String {
    "mp4".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            manifest_name: default_manifest_name(),
            stream_template: default_stream_template(),
            output_extension: default_output_extension(),
            compact: false,
            skip_missing_init: false,
        }
    }
}

impl ExportConfig {
    pub fn missing_init_policy(&self) -> MissingInitPolicy {
        if self.skip_missing_init {
            MissingInitPolicy::Skip
        } else {
            MissingInitPolicy::Abort
        }
    }

    pub fn join_options(&self) -> JoinOptions {
        JoinOptions {
            compact: self.compact,
            stream_template: self.stream_template.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}
