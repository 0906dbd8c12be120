//! clipexport - rebuild a playable video from a recorded DASH clip
//!
//! This library crate exposes the export pipeline for integration testing.

pub mod config;
pub mod export;
pub mod progress;
