use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A non-fatal anomaly found while migrating an export.
///
/// Every variant carries enough context to locate the problem by hand, and
/// serializes with a `kind` tag so a run's warnings can be filtered as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The index document has no page list marker
    MissingIndexMarker { marker: String },
    /// The content tree has no pages besides the root
    EmptyContentTree,
    /// A flat identifier already carries the page file extension
    IdentifierHasExtension { identifier: String },
    /// The same flat identifier appears more than once in the index
    DuplicateIdentifier { identifier: String, kept: String },
    /// Two siblings normalized to the same directory segment
    SegmentCollision { identifier: String, segment: String },
    /// A page listed in the index has no source file
    MissingPage { identifier: String, source: PathBuf },
    /// An attachment manifest line that is not a `[name](path) (type)` triple
    UnparseableManifestEntry { page: String, entry: String },
    /// An attachment whose storage path points at another page id
    InconsistentPageId {
        page: String,
        expected: String,
        found: String,
    },
    /// An attachment listed in a manifest is not on disk
    MissingAttachmentSource {
        page: String,
        source: PathBuf,
        destination: PathBuf,
    },
    /// An existing destination file was replaced
    DestinationOverwritten { page: String, destination: PathBuf },
    /// More than one distinct file landed under one meaningful name
    MultipleCopies {
        page: String,
        name: String,
        destination: PathBuf,
    },
    /// Copied plus skipped files do not account for the source directory
    IntegrityMismatch {
        page: String,
        source_dir: PathBuf,
        copied: usize,
        skipped: usize,
        source_count: usize,
    },
    /// A diagram attachment could not be inflated
    DiagramInflateFailed {
        page: String,
        source: PathBuf,
        reason: String,
    },
    /// An embedded image payload lacks the expected encoding prefix
    UnencodedPayload { page: String, prefix: String },
    /// An image reference that matches no attachment of its page
    UnresolvedAttachmentReference { page: String, reference: String },
    /// A document without any depth-1 heading
    NoTopLevelHeading { document: String },
    /// A manual adjustment targets a file that does not exist
    AdjustmentFileMissing { file: PathBuf },
    /// A manual adjustment's original text is no longer in its file
    AdjustmentTextNotFound { file: PathBuf, text: String },
}

impl Warning {
    /// Stable identifier for grepping logs.
    pub fn code(&self) -> &'static str {
        match self {
            Warning::MissingIndexMarker { .. } => "missing-index-marker",
            Warning::EmptyContentTree => "empty-content-tree",
            Warning::IdentifierHasExtension { .. } => "identifier-has-extension",
            Warning::DuplicateIdentifier { .. } => "duplicate-identifier",
            Warning::SegmentCollision { .. } => "segment-collision",
            Warning::MissingPage { .. } => "missing-page",
            Warning::UnparseableManifestEntry { .. } => "unparseable-manifest-entry",
            Warning::InconsistentPageId { .. } => "inconsistent-page-id",
            Warning::MissingAttachmentSource { .. } => "missing-attachment-source",
            Warning::DestinationOverwritten { .. } => "destination-overwritten",
            Warning::MultipleCopies { .. } => "multiple-copies",
            Warning::IntegrityMismatch { .. } => "integrity-mismatch",
            Warning::DiagramInflateFailed { .. } => "diagram-inflate-failed",
            Warning::UnencodedPayload { .. } => "unencoded-payload",
            Warning::UnresolvedAttachmentReference { .. } => "unresolved-attachment-reference",
            Warning::NoTopLevelHeading { .. } => "no-top-level-heading",
            Warning::AdjustmentFileMissing { .. } => "adjustment-file-missing",
            Warning::AdjustmentTextNotFound { .. } => "adjustment-text-not-found",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingIndexMarker { marker } => {
                write!(f, "index document has no '{}' list", marker)
            }
            Warning::EmptyContentTree => write!(f, "content tree has no pages"),
            Warning::IdentifierHasExtension { identifier } => {
                write!(f, "identifier '{}' already carries a page extension", identifier)
            }
            Warning::DuplicateIdentifier { identifier, kept } => {
                write!(f, "identifier '{}' listed again, keeping {}", identifier, kept)
            }
            Warning::SegmentCollision { identifier, segment } => {
                write!(f, "identifier '{}' renamed to '{}' to avoid a sibling collision", identifier, segment)
            }
            Warning::MissingPage { identifier, source } => {
                write!(f, "page '{}' not found at {}", identifier, source.display())
            }
            Warning::UnparseableManifestEntry { page, entry } => {
                write!(f, "page '{}': cannot parse attachment entry '{}'", page, entry)
            }
            Warning::InconsistentPageId { page, expected, found } => {
                write!(f, "page '{}': attachment page id {} differs from {}", page, found, expected)
            }
            Warning::MissingAttachmentSource { page, source, destination } => write!(
                f,
                "page '{}': {} does not exist (meaningful name: {})",
                page,
                source.display(),
                destination.display()
            ),
            Warning::DestinationOverwritten { page, destination } => {
                write!(f, "page '{}': overwriting {}", page, destination.display())
            }
            Warning::MultipleCopies { page, name, destination } => write!(
                f,
                "page '{}': several distinct files named '{}', latest at {}",
                page,
                name,
                destination.display()
            ),
            Warning::IntegrityMismatch { page, source_dir, copied, skipped, source_count } => write!(
                f,
                "page '{}': {} copied and {} skipped, but {} files in {}",
                page,
                copied,
                skipped,
                source_count,
                source_dir.display()
            ),
            Warning::DiagramInflateFailed { page, source, reason } => {
                write!(f, "page '{}': cannot inflate {}: {}", page, source.display(), reason)
            }
            Warning::UnencodedPayload { page, prefix } => {
                write!(f, "page '{}': payload is not base64 encoded: {}", page, prefix)
            }
            Warning::UnresolvedAttachmentReference { page, reference } => {
                write!(f, "page '{}': no attachment for {}", page, reference)
            }
            Warning::NoTopLevelHeading { document } => {
                write!(f, "'{}' has no depth-1 heading", document)
            }
            Warning::AdjustmentFileMissing { file } => {
                write!(f, "{} doesn't exist", file.display())
            }
            Warning::AdjustmentTextNotFound { file, text } => {
                write!(f, "'{}' not found in {}", text, file.display())
            }
        }
    }
}
