//! # clipexport-dash
//!
//! Reconstruction of per-track streams from a DASH recording directory.
//!
//! This crate provides:
//! - Filename template resolution (`$RepresentationID$`, `$Number%05d$`)
//! - Manifest (MPD) parsing into typed [`Representation`]s
//! - Discovery of the contiguous segment range present on disk
//! - Joining init chunk and media segments into one stream file per track
//!
//! ## Features
//!
//! - `serialize` - serde support for the manifest types
//!
//! ## Example
//!
//! ```no_run
//! use clipexport_dash::{discover_all, manifest, DirectorySource, JoinOptions, Joiner, MissingInitPolicy};
//! use std::path::Path;
//!
//! let dir = Path::new("/recordings/clip_1");
//! let reps = manifest::parse_file(&dir.join("session.mpd"))?;
//! let reps = discover_all(reps, &DirectorySource::new(dir), MissingInitPolicy::Abort)?;
//!
//! let joiner = Joiner::new(dir, JoinOptions::default());
//! for outcome in joiner.join_all(&reps)? {
//!     println!("{:?}", outcome);
//! }
//! # Ok::<(), clipexport_dash::Error>(())
//! ```

pub mod discover;
pub mod error;
pub mod join;
pub mod manifest;
pub mod representation;
pub mod template;

// Re-exports
pub use discover::{discover, discover_all, DirectorySource, MissingInitPolicy, SegmentSource};
pub use error::{DiscoverError, Error, ManifestError, Result, TemplateError};
pub use join::{
    JoinOptions, JoinOutcome, JoinProgress, JoinReport, Joiner, SkipReason,
    DEFAULT_STREAM_TEMPLATE,
};
pub use representation::{Representation, SegmentRange};
pub use template::{Bindings, FilenameTemplate};
