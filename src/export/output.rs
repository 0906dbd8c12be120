use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Name of the exported file when the user gives no file name.
///
/// The clip directory name is used as the stem, so `clip_2024/` exports to
/// `clip_2024.mp4`.
pub fn default_file_name(input_dir: &Path, extension: &str) -> Result<String> {
    let name = match input_dir.file_name() {
        Some(name) => name.to_os_string(),
        None => std::fs::canonicalize(input_dir)
            .with_context(|| format!("Failed to resolve input directory: {:?}", input_dir))?
            .file_name()
            .map(|n| n.to_os_string())
            .with_context(|| format!("Input directory has no name: {:?}", input_dir))?,
    };

    Ok(format!("{}.{}", name.to_string_lossy(), extension))
}

/// Decide where the exported file goes.
///
/// - no output: `<input-dir-name>.<ext>` in the current directory
/// - an existing directory: `<dir>/<input-dir-name>.<ext>`
/// - anything else: used as the file path
pub fn resolve_output_path(
    input_dir: &Path,
    output: Option<&Path>,
    extension: &str,
) -> Result<PathBuf> {
    match output {
        None => Ok(PathBuf::from(default_file_name(input_dir, extension)?)),
        Some(dir) if dir.is_dir() => Ok(dir.join(default_file_name(input_dir, extension)?)),
        Some(path) => Ok(path.to_path_buf()),
    }
}
