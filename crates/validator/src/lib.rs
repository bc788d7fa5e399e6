//! Embedded artwork validation: extraction, decoding, constraint checks,
//! reporting, and the directory walk that ties them together.

pub mod constraints;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod walk;

pub use constraints::{ConstraintSet, CoverImage, DimensionCheck};
pub use error::FileError;
pub use extract::{CoverExtractor, EmbeddedPicture, PictureKind, TagExtractor};
pub use pipeline::{FileOutcome, FileReport, NO_COVER, Pipeline, Violation};
pub use probe::{CodecProbe, ImageProbe, ProbedImage};
pub use report::{Reporter, RunProgress};
pub use walk::{RunSummary, Scanner, accessible_directories, candidates};
