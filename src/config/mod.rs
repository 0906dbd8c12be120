mod types;

pub use types::*;

use anyhow::{Context, Result};
use clipexport_dash::template::{FilenameTemplate, REPRESENTATION_ID};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    tracing::debug!("Loaded config from {:?}", path);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./clipexport.toml", "~/.config/clipexport/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let export = &config.export;

    if export.manifest_name.trim().is_empty() {
        anyhow::bail!("export.manifest_name cannot be empty");
    }

    if !FilenameTemplate::new(export.stream_template.as_str()).references(REPRESENTATION_ID) {
        anyhow::bail!(
            "export.stream_template '{}' must contain ${}$ so each stream gets its own file",
            export.stream_template,
            REPRESENTATION_ID
        );
    }

    if export.output_extension.trim().is_empty() {
        anyhow::bail!("export.output_extension cannot be empty");
    }

    if let Some(ref ffmpeg) = config.tools.ffmpeg_path {
        if !ffmpeg.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", ffmpeg);
        }
    }

    Ok(())
}
