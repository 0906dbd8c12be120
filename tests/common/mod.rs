//! Shared fixtures for integration tests.
//!
//! [`Clip`] lays out a recording directory the way the capture side writes
//! it: a `session.mpd` next to init chunks and numbered media segments.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MPD_HEADER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" profiles="urn:mpeg:dash:profile:isoff-live:2011" type="static">
  <Period id="0" start="PT0.0S">"#;

pub const MPD_FOOTER: &str = r#"
  </Period>
</MPD>
"#;

/// Manifest with a video and an audio representation sharing one template.
pub fn two_stream_manifest() -> String {
    format!(
        r#"{MPD_HEADER}
    <AdaptationSet id="0" contentType="video" mimeType="video/mp4">
      <SegmentTemplate initialization="init-stream$RepresentationID$.m4s"
                       media="chunk-stream$RepresentationID$-$Number%05d$.m4s" startNumber="1"/>
      <Representation id="0" codecs="avc1.64002a" bandwidth="12000000"/>
    </AdaptationSet>
    <AdaptationSet id="1" contentType="audio" mimeType="audio/mp4">
      <SegmentTemplate initialization="init-stream$RepresentationID$.m4s"
                       media="chunk-stream$RepresentationID$-$Number%05d$.m4s" startNumber="1"/>
      <Representation id="1" codecs="opus" bandwidth="128000"/>
    </AdaptationSet>{MPD_FOOTER}"#
    )
}

/// Manifest with a single video representation, id 0.
pub fn single_stream_manifest() -> String {
    format!(
        r#"{MPD_HEADER}
    <AdaptationSet id="0" contentType="video" mimeType="video/mp4">
      <SegmentTemplate initialization="init-stream$RepresentationID$.m4s"
                       media="chunk-stream$RepresentationID$-$Number%05d$.m4s" startNumber="1"/>
      <Representation id="0" codecs="avc1.64002a"/>
    </AdaptationSet>{MPD_FOOTER}"#
    )
}

/// A recording directory inside a temp dir.
pub struct Clip {
    // Held for its Drop
    _root: TempDir,
    dir: PathBuf,
}

impl Clip {
    /// Create an empty clip directory named `clip_test`.
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("clip_test");
        fs::create_dir(&dir).unwrap();
        Self { _root: root, dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn with_manifest(self, text: &str) -> Self {
        fs::write(self.path("session.mpd"), text).unwrap();
        self
    }

    /// Write the init chunk of representation `id`.
    pub fn with_init(self, id: u32, bytes: &[u8]) -> Self {
        fs::write(self.path(&format!("init-stream{id}.m4s")), bytes).unwrap();
        self
    }

    /// Write media segment `number` of representation `id`.
    pub fn with_segment(self, id: u32, number: u64, bytes: &[u8]) -> Self {
        fs::write(self.path(&segment_name(id, number)), bytes).unwrap();
        self
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}

pub fn segment_name(id: u32, number: u64) -> String {
    format!("chunk-stream{id}-{number:05}.m4s")
}

/// Standard two-stream clip: three video segments, two audio segments.
pub fn two_stream_clip() -> Clip {
    Clip::new()
        .with_manifest(&two_stream_manifest())
        .with_init(0, b"VINIT")
        .with_segment(0, 1, b"v1")
        .with_segment(0, 2, b"v2")
        .with_segment(0, 3, b"v3")
        .with_init(1, b"AINIT")
        .with_segment(1, 1, b"a1")
        .with_segment(1, 2, b"a2")
}
