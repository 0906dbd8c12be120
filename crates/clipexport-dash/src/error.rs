//! Error types for clipexport-dash.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for clipexport-dash operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for clipexport-dash operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Filename template could not be resolved.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Manifest could not be turned into representations.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Segment discovery failed for a representation.
    #[error(transparent)]
    Discover(#[from] DiscoverError),

    /// I/O error occurred.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Attach the path an I/O error happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from filename template resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder names a value that was not bound.
    #[error("missing value for template placeholder '{name}'")]
    MissingBinding { name: String },
}

/// Errors from manifest parsing.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest is not well-formed XML.
    #[error("malformed manifest XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document root is not an MPD element in the DASH namespace.
    #[error("manifest root must be <MPD> in namespace {namespace}, found <{found}>")]
    UnexpectedRoot { namespace: &'static str, found: String },

    /// A representation has no id attribute.
    #[error("representation #{index} has no 'id' attribute")]
    MissingId { index: usize },

    /// Neither the representation nor its adaptation set has a SegmentTemplate.
    #[error("no SegmentTemplate found for representation '{id}'")]
    MissingSegmentTemplate { id: String },

    /// A required SegmentTemplate attribute is absent.
    #[error("representation '{id}' is missing required attribute '{attribute}'")]
    MissingAttribute { id: String, attribute: &'static str },

    /// An attribute that must be numeric is not.
    #[error("representation '{id}' has invalid {attribute} '{value}'")]
    InvalidAttribute {
        id: String,
        attribute: &'static str,
        value: String,
    },

    /// Two representations share the same id.
    #[error("duplicate representation id '{id}'")]
    DuplicateId { id: u32 },

    /// The manifest declares no representations.
    #[error("manifest declares no representations")]
    NoRepresentations,
}

/// Errors from segment range discovery.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The initialization chunk for a representation is not on disk.
    #[error("initialization chunk '{filename}' not found for representation '{id}'")]
    MissingInit { id: u32, filename: String },

    /// Every representation was dropped, leaving nothing to export.
    #[error("no representation has an initialization chunk on disk")]
    NothingToExport,
}
