//! Typed manifest entities.

use crate::error::TemplateError;
use crate::template::{resolve, Bindings};
use std::ops::Range;

/// Contiguous run of media segments present on disk.
///
/// `max` is exclusive: it is the first segment number whose file was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentRange {
    pub min: u64,
    pub max: u64,
}

impl SegmentRange {
    /// Create a range, clamping `max` so that `max >= min` holds.
    pub fn new(min: u64, max: u64) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Number of segments in the range.
    pub fn len(&self) -> u64 {
        self.max.saturating_sub(self.min)
    }

    pub fn is_empty(&self) -> bool {
        self.max <= self.min
    }

    /// Segment numbers in ascending order.
    pub fn numbers(&self) -> Range<u64> {
        self.min..self.max
    }
}

/// One elementary stream described by the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Representation {
    /// Identifier, substituted as `$RepresentationID$`.
    pub id: u32,
    /// Initialization chunk filename template.
    pub initialization: String,
    /// Media segment filename template.
    pub media: String,
    /// First valid segment number.
    pub start_number: u64,
    /// Segments found on disk, set by discovery.
    pub segments: Option<SegmentRange>,
    pub bandwidth: Option<u64>,
    pub mime_type: Option<String>,
    pub codecs: Option<String>,
}

impl Representation {
    /// Create a representation with the default start number of 1.
    pub fn new(id: u32, initialization: impl Into<String>, media: impl Into<String>) -> Self {
        Self {
            id,
            initialization: initialization.into(),
            media: media.into(),
            start_number: 1,
            segments: None,
            bandwidth: None,
            mime_type: None,
            codecs: None,
        }
    }

    pub fn with_start_number(mut self, start_number: u64) -> Self {
        self.start_number = start_number;
        self
    }

    /// Filename of the initialization chunk.
    pub fn init_filename(&self) -> Result<String, TemplateError> {
        resolve(&self.initialization, &Bindings::for_representation(self.id))
    }

    /// Filename of media segment `number`.
    pub fn segment_filename(&self, number: u64) -> Result<String, TemplateError> {
        resolve(&self.media, &Bindings::for_segment(self.id, number))
    }

    /// Short content description for logs.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("id {}", self.id)];
        if let Some(ref mime) = self.mime_type {
            parts.push(mime.clone());
        }
        if let Some(ref codecs) = self.codecs {
            parts.push(codecs.clone());
        }
        if let Some(bandwidth) = self.bandwidth {
            parts.push(format!("{} bps", bandwidth));
        }
        parts.join(", ")
    }
}
