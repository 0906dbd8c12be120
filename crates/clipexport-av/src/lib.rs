//! # clipexport-av
//!
//! External tool handling for clipexport.
//!
//! This crate provides:
//! - Detection of the ffmpeg executable (configured path or PATH lookup)
//! - The [`Muxer`] seam and an ffmpeg stream copy implementation
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use clipexport_av::{FfmpegMuxer, Muxer};
//! use std::path::{Path, PathBuf};
//!
//! let muxer = FfmpegMuxer::locate(None)?;
//! muxer.mux(
//!     &[PathBuf::from("clip/stream-0.m4s"), PathBuf::from("clip/stream-1.m4s")],
//!     Path::new("clip.mp4"),
//! )?;
//! # Ok::<(), clipexport_av::Error>(())
//! ```

mod error;
pub mod mux;
pub mod tools;

// Re-exports
pub use error::{Error, Result};
pub use mux::{FfmpegMuxer, Muxer};
pub use tools::{check_tool, check_tools, get_tool_path, ToolInfo};
