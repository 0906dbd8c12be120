//! Segment range discovery.
//!
//! For every representation the init chunk must be present; media segments
//! are then probed from `start_number` upwards until the first missing file.
//! Segments after a gap are never used.

use crate::error::DiscoverError;
use crate::representation::{Representation, SegmentRange};
use crate::template::{FilenameTemplate, NUMBER};
use crate::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Answers whether a chunk file is available.
pub trait SegmentSource {
    fn exists(&self, filename: &str) -> bool;
}

/// Chunk files stored in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SegmentSource for DirectorySource {
    fn exists(&self, filename: &str) -> bool {
        self.dir.join(filename).is_file()
    }
}

impl SegmentSource for HashSet<String> {
    fn exists(&self, filename: &str) -> bool {
        self.contains(filename)
    }
}

/// What to do with a representation whose init chunk is not on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MissingInitPolicy {
    /// Fail the whole export.
    #[default]
    Abort,
    /// Warn and leave the representation out.
    Skip,
}

/// Find the contiguous segment range of one representation and record it.
///
/// Running discovery again replaces the recorded range.
pub fn discover(rep: &mut Representation, source: &dyn SegmentSource) -> Result<SegmentRange> {
    let init = rep.init_filename()?;
    if !source.exists(&init) {
        return Err(DiscoverError::MissingInit {
            id: rep.id,
            filename: init,
        }
        .into());
    }

    let start = rep.start_number;
    let end = if FilenameTemplate::new(rep.media.as_str()).references(NUMBER) {
        let mut n = start;
        while source.exists(&rep.segment_filename(n)?) {
            match n.checked_add(1) {
                Some(next) => n = next,
                None => break,
            }
        }
        n
    } else {
        // Template without $Number$ names a single file
        if source.exists(&rep.segment_filename(start)?) {
            start.checked_add(1).unwrap_or(start)
        } else {
            start
        }
    };

    let range = SegmentRange::new(start, end);
    rep.segments = Some(range);

    if range.is_empty() {
        tracing::warn!(
            "No media segments found for representation '{}' starting at {}",
            rep.id,
            start
        );
    } else {
        tracing::debug!(
            "Representation {}: segments [{}, {}) ({} chunks)",
            rep.describe(),
            range.min,
            range.max,
            range.len()
        );
    }

    Ok(range)
}

/// Discover ranges for every representation, keeping manifest order.
///
/// Under [`MissingInitPolicy::Skip`] representations without an init chunk
/// are dropped with a warning; it is an error if none remain.
pub fn discover_all(
    representations: Vec<Representation>,
    source: &dyn SegmentSource,
    policy: MissingInitPolicy,
) -> Result<Vec<Representation>> {
    let mut kept = Vec::with_capacity(representations.len());

    for mut rep in representations {
        match discover(&mut rep, source) {
            Ok(_) => kept.push(rep),
            Err(crate::Error::Discover(DiscoverError::MissingInit { id, filename }))
                if policy == MissingInitPolicy::Skip =>
            {
                tracing::warn!(
                    "Initialization chunk '{}' not found for representation '{}', skipping it",
                    filename,
                    id
                );
            }
            Err(e) => return Err(e),
        }
    }

    if kept.is_empty() {
        return Err(DiscoverError::NothingToExport.into());
    }

    Ok(kept)
}
