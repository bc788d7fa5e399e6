//! Per-file check: extract → probe → evaluate.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constraints::{ConstraintSet, CoverImage};
use crate::error::FileError;
use crate::extract::{CoverExtractor, EmbeddedPicture};
use crate::probe::ImageProbe;

pub const NO_COVER: &str = "No cover found.";

/// A file whose artwork failed at least one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: PathBuf,
    pub fragments: Vec<String>,
}

impl Violation {
    pub fn message(&self) -> String {
        self.fragments.join(" ")
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    Clean,
    Violation(Violation),
    Failed(FileError),
}

/// Outcome of one file plus any side diagnostics (e.g. a failed size
/// measurement) that do not change the outcome.
#[derive(Debug)]
pub struct FileReport {
    pub outcome: FileOutcome,
    pub diagnostics: Vec<String>,
}

impl FileReport {
    fn failed(err: FileError) -> Self {
        FileReport {
            outcome: FileOutcome::Failed(err),
            diagnostics: Vec::new(),
        }
    }
}

pub struct Pipeline<E, P> {
    extractor: E,
    probe: P,
    constraints: ConstraintSet,
}

impl<E: CoverExtractor, P: ImageProbe> Pipeline<E, P> {
    pub fn new(extractor: E, probe: P, constraints: ConstraintSet) -> Self {
        Self {
            extractor,
            probe,
            constraints,
        }
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Check a single audio file. Never fails; problems are part of the
    /// returned report.
    pub fn check(&self, path: &Path) -> FileReport {
        let pictures = match self.extractor.extract(path) {
            Ok(pictures) => pictures,
            Err(err) => return FileReport::failed(err),
        };

        // First real picture wins; the rest are ignored
        let Some(picture) = pictures.into_iter().find(EmbeddedPicture::is_picture) else {
            return FileReport {
                outcome: FileOutcome::Violation(Violation {
                    path: path.to_path_buf(),
                    fragments: vec![NO_COVER.to_string()],
                }),
                diagnostics: Vec::new(),
            };
        };

        let probed = match self.probe.probe(&picture.data, self.constraints.measures_size()) {
            Ok(probed) => probed,
            Err(err) => return FileReport::failed(err),
        };

        let mut diagnostics = Vec::new();
        let size_kb = match probed.size_kb {
            Some(Ok(kb)) => Some(kb),
            Some(Err(err)) => {
                diagnostics.push(format!(
                    "Could not get image size from file {}, Reason: {}",
                    path.display(),
                    err
                ));
                None
            }
            None => None,
        };

        let cover = CoverImage {
            data: picture.data,
            dimensions: probed.dimensions,
            size_kb,
        };
        debug!(path = %path.display(), dimensions = %cover.dimensions, size_kb = ?cover.size_kb, "probed artwork");

        let fragments = self.constraints.evaluate(&cover);
        let outcome = if fragments.is_empty() {
            FileOutcome::Clean
        } else {
            FileOutcome::Violation(Violation {
                path: path.to_path_buf(),
                fragments,
            })
        };

        FileReport {
            outcome,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PictureKind;
    use crate::probe::{CodecProbe, ProbedImage};
    use crate::testing::png_bytes;
    use artsize_core::Resolution;

    /// Hands out a fixed list of pictures for every path
    struct FixedPictures(Vec<EmbeddedPicture>);

    impl CoverExtractor for FixedPictures {
        fn extract(&self, _path: &Path) -> Result<Vec<EmbeddedPicture>, FileError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenTags;

    impl CoverExtractor for BrokenTags {
        fn extract(&self, _path: &Path) -> Result<Vec<EmbeddedPicture>, FileError> {
            Err(FileError::Io(std::io::Error::other("tag header is corrupt")))
        }
    }

    /// Reports fixed dimensions and size without decoding anything
    struct FakeProbe {
        dimensions: Resolution,
        size_kb: Option<u64>,
    }

    impl ImageProbe for FakeProbe {
        fn probe(&self, _data: &[u8], measure_size: bool) -> Result<ProbedImage, FileError> {
            Ok(ProbedImage {
                dimensions: self.dimensions,
                size_kb: measure_size.then(|| self.size_kb.ok_or(FileError::UnknownFormat)),
            })
        }
    }

    fn picture(kind: PictureKind, data: Vec<u8>) -> EmbeddedPicture {
        EmbeddedPicture {
            kind,
            mime_type: Some("image/png".to_string()),
            data,
        }
    }

    fn fake_probe(width: u32, height: u32, size_kb: Option<u64>) -> FakeProbe {
        FakeProbe {
            dimensions: Resolution::new(width, height),
            size_kb,
        }
    }

    fn min_300() -> ConstraintSet {
        ConstraintSet {
            min_threshold: Some(Resolution::new(300, 300)),
            ..Default::default()
        }
    }

    fn violation_message(report: &FileReport) -> String {
        match &report.outcome {
            FileOutcome::Violation(v) => v.message(),
            other => panic!("expected a violation, got {other:?}"),
        }
    }

    #[test]
    fn test_no_pictures_is_no_cover() {
        let pipeline = Pipeline::new(FixedPictures(vec![]), CodecProbe, min_300());
        let report = pipeline.check(Path::new("song.mp3"));
        assert_eq!(violation_message(&report), "No cover found.");
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_only_non_pictures_is_no_cover() {
        let extractor = FixedPictures(vec![
            picture(PictureKind::NotAPicture, png_bytes(10, 10)),
            picture(PictureKind::NotAPicture, png_bytes(20, 20)),
        ]);
        let constraints = ConstraintSet {
            min_threshold: Some(Resolution::new(300, 300)),
            max_threshold: Some(Resolution::new(400, 400)),
            check_ratio: true,
            max_size_kb: Some(1.0),
        };
        let pipeline = Pipeline::new(extractor, CodecProbe, constraints);

        let report = pipeline.check(Path::new("song.mp3"));
        match report.outcome {
            FileOutcome::Violation(v) => assert_eq!(v.fragments, vec![NO_COVER]),
            other => panic!("expected a violation, got {other:?}"),
        }
    }

    #[test]
    fn test_first_picture_wins() {
        let extractor = FixedPictures(vec![
            picture(PictureKind::NotAPicture, png_bytes(10, 10)),
            picture(PictureKind::FrontCover, png_bytes(200, 200)),
            picture(PictureKind::BackCover, png_bytes(600, 600)),
        ]);
        let pipeline = Pipeline::new(extractor, CodecProbe, min_300());

        let report = pipeline.check(Path::new("song.mp3"));
        assert_eq!(violation_message(&report), "Artwork image size is 200x200");
    }

    #[test]
    fn test_conforming_cover_is_clean() {
        let extractor = FixedPictures(vec![picture(PictureKind::FrontCover, png_bytes(500, 500))]);
        let mut constraints = min_300();
        constraints.check_ratio = true;
        constraints.max_threshold = Some(Resolution::new(600, 600));
        let pipeline = Pipeline::new(extractor, CodecProbe, constraints);

        let report = pipeline.check(Path::new("song.mp3"));
        assert!(matches!(report.outcome, FileOutcome::Clean));
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_extract_failure_is_file_error() {
        let pipeline = Pipeline::new(BrokenTags, CodecProbe, min_300());
        let report = pipeline.check(Path::new("song.mp3"));
        match report.outcome {
            FileOutcome::Failed(err) => assert!(err.to_string().contains("tag header is corrupt")),
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[test]
    fn test_undecodable_cover_is_file_error_not_violation() {
        let extractor = FixedPictures(vec![picture(PictureKind::FrontCover, b"garbage".to_vec())]);
        let pipeline = Pipeline::new(extractor, CodecProbe, min_300());

        let report = pipeline.check(Path::new("song.mp3"));
        assert!(matches!(report.outcome, FileOutcome::Failed(FileError::Decode(_))));
    }

    #[test]
    fn test_size_only_violation() {
        let extractor = FixedPictures(vec![picture(PictureKind::FrontCover, vec![1])]);
        let constraints = ConstraintSet {
            min_threshold: Some(Resolution::new(300, 300)),
            check_ratio: true,
            max_size_kb: Some(50.0),
            ..Default::default()
        };
        let pipeline = Pipeline::new(extractor, fake_probe(500, 500, Some(80)), constraints);

        let report = pipeline.check(Path::new("song.mp3"));
        assert_eq!(violation_message(&report), "Artwork file size is 80 kB.");
    }

    #[test]
    fn test_ratio_only_violation() {
        let extractor = FixedPictures(vec![picture(PictureKind::FrontCover, vec![1])]);
        let constraints = ConstraintSet {
            check_ratio: true,
            max_size_kb: Some(50.0),
            ..Default::default()
        };
        let pipeline = Pipeline::new(extractor, fake_probe(300, 250, Some(20)), constraints);

        let report = pipeline.check(Path::new("song.mp3"));
        assert_eq!(violation_message(&report), "Artwork image size is 300x250");
    }

    #[test]
    fn test_size_and_ratio_violations_share_a_line() {
        let extractor = FixedPictures(vec![picture(PictureKind::FrontCover, vec![1])]);
        let constraints = ConstraintSet {
            check_ratio: true,
            max_size_kb: Some(50.0),
            ..Default::default()
        };
        let pipeline = Pipeline::new(extractor, fake_probe(300, 250, Some(80)), constraints);

        let report = pipeline.check(Path::new("song.mp3"));
        assert_eq!(
            violation_message(&report),
            "Artwork file size is 80 kB. Artwork image size is 300x250"
        );
    }

    #[test]
    fn test_size_measurement_failure_still_checks_dimensions() {
        let extractor = FixedPictures(vec![picture(PictureKind::FrontCover, vec![1])]);
        let constraints = ConstraintSet {
            min_threshold: Some(Resolution::new(300, 300)),
            max_size_kb: Some(50.0),
            ..Default::default()
        };
        let pipeline = Pipeline::new(extractor, fake_probe(200, 200, None), constraints);

        let report = pipeline.check(Path::new("song.mp3"));
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].starts_with("Could not get image size from file song.mp3"));
        assert_eq!(violation_message(&report), "Artwork image size is 200x200");
    }

    #[test]
    fn test_size_not_measured_without_limit() {
        let extractor = FixedPictures(vec![picture(PictureKind::FrontCover, vec![1])]);
        // the fake probe would fail a size measurement
        let pipeline = Pipeline::new(extractor, fake_probe(400, 400, None), min_300());

        let report = pipeline.check(Path::new("song.mp3"));
        assert!(matches!(report.outcome, FileOutcome::Clean));
        assert!(report.diagnostics.is_empty());
    }
}
