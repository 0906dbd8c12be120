//! Terminal progress display for exports.

use crate::export::ExportObserver;
use clipexport_dash::JoinProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

fn join_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg}\n[{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} chunks")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

fn mux_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Progress bars per joined stream plus a spinner while muxing.
pub struct TerminalProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<u32, ProgressBar>>,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            spinner: Mutex::new(None),
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportObserver for TerminalProgress {
    fn on_join_progress(&self, progress: &JoinProgress) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };

        let bar = bars.entry(progress.id).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new(progress.total));
            bar.set_style(join_style());
            bar.set_message(format!(
                "Joining segments for media stream with ID: {}",
                progress.id
            ));
            bar
        });

        bar.set_position(progress.done);
        if progress.done >= progress.total {
            bar.finish();
        }
    }

    fn on_mux_started(&self, _inputs: &[PathBuf], _output: &Path) {
        let spinner = self.multi.add(ProgressBar::new_spinner());
        spinner.set_style(mux_style());
        spinner.set_message("Merging streams into final output file...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    fn on_mux_finished(&self, output: &Path, success: bool) {
        let Some(spinner) = self.spinner.lock().ok().and_then(|mut slot| slot.take()) else {
            return;
        };

        if success {
            spinner.finish_with_message(format!(
                "\u{2713} Video exported successfully! (Saved as: {})",
                output.display()
            ));
        } else {
            spinner.abandon_with_message("Merging streams failed");
        }
    }
}
