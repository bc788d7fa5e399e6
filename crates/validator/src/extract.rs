//! Embedded artwork extraction.

use lofty::picture::{Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::path::Path;

use crate::error::FileError;

/// Declared role of an embedded picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureKind {
    FrontCover,
    BackCover,
    Other,
    /// A picture slot with an undefined type code, not usable as artwork
    NotAPicture,
}

impl From<PictureType> for PictureKind {
    fn from(ty: PictureType) -> Self {
        match ty {
            PictureType::CoverFront => PictureKind::FrontCover,
            PictureType::CoverBack => PictureKind::BackCover,
            PictureType::Undefined(_) => PictureKind::NotAPicture,
            _ => PictureKind::Other,
        }
    }
}

/// One picture payload found in a file's tags
#[derive(Debug, Clone)]
pub struct EmbeddedPicture {
    pub kind: PictureKind,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl EmbeddedPicture {
    pub fn is_picture(&self) -> bool {
        self.kind != PictureKind::NotAPicture
    }
}

impl From<&Picture> for EmbeddedPicture {
    fn from(pic: &Picture) -> Self {
        EmbeddedPicture {
            kind: pic.pic_type().into(),
            mime_type: pic.mime_type().map(|m| m.as_str().to_string()),
            data: pic.data().to_vec(),
        }
    }
}

/// Source of embedded pictures for an audio file.
pub trait CoverExtractor {
    /// Return every embedded picture, in tag order. An empty list means
    /// the file has readable tags but no artwork.
    fn extract(&self, path: &Path) -> Result<Vec<EmbeddedPicture>, FileError>;
}

/// Reads pictures from the file's tags with lofty. Pictures of the primary
/// tag (ID3v2 for MP3) come first, then those of any secondary tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagExtractor;

impl CoverExtractor for TagExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<EmbeddedPicture>, FileError> {
        let tagged_file = Probe::open(path)?.read()?;

        let primary = tagged_file.primary_tag_type();
        let mut tags: Vec<&Tag> = tagged_file.tags().iter().collect();
        tags.sort_by_key(|tag| tag.tag_type() != primary);

        Ok(tags
            .into_iter()
            .flat_map(|tag| tag.pictures())
            .map(EmbeddedPicture::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSet;
    use crate::pipeline::{FileOutcome, NO_COVER, Pipeline};
    use crate::probe::CodecProbe;
    use crate::testing::png_bytes;
    use artsize_core::Resolution;
    use lofty::config::WriteOptions;
    use lofty::picture::MimeType;
    use lofty::tag::TagType;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Ten silent MPEG-1 Layer III frames (128 kbps, 44.1 kHz).
    fn mpeg_frames() -> Vec<u8> {
        let mut frame = vec![0xFF, 0xFB, 0x90, 0x64];
        frame.resize(417, 0);
        frame.repeat(10)
    }

    /// Write an MP3 at `dir/name` whose ID3v2 tag holds `pictures`.
    fn tagged_mp3(dir: &TempDir, name: &str, pictures: Vec<Picture>) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, mpeg_frames()).unwrap();

        let mut tag = Tag::new(TagType::Id3v2);
        for picture in pictures {
            tag.push_picture(picture);
        }
        tag.save_to_path(&path, WriteOptions::default()).unwrap();
        path
    }

    fn png_picture(pic_type: PictureType, width: u32, height: u32) -> Picture {
        Picture::new_unchecked(pic_type, Some(MimeType::Png), None, png_bytes(width, height))
    }

    fn threshold_pipeline() -> Pipeline<TagExtractor, CodecProbe> {
        let constraints = ConstraintSet {
            min_threshold: Some(Resolution::new(300, 300)),
            ..Default::default()
        };
        Pipeline::new(TagExtractor, CodecProbe, constraints)
    }

    #[test]
    fn test_picture_kind_mapping() {
        assert_eq!(PictureKind::from(PictureType::CoverFront), PictureKind::FrontCover);
        assert_eq!(PictureKind::from(PictureType::CoverBack), PictureKind::BackCover);
        assert_eq!(PictureKind::from(PictureType::Artist), PictureKind::Other);
        assert_eq!(PictureKind::from(PictureType::Other), PictureKind::Other);
        assert_eq!(PictureKind::from(PictureType::Undefined(0xFF)), PictureKind::NotAPicture);
    }

    #[test]
    fn test_is_picture() {
        let mut pic = EmbeddedPicture {
            kind: PictureKind::FrontCover,
            mime_type: None,
            data: vec![],
        };
        assert!(pic.is_picture());
        pic.kind = PictureKind::NotAPicture;
        assert!(!pic.is_picture());
    }

    #[test]
    fn test_extract_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = TagExtractor.extract(&dir.path().join("missing.mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_unknown_format_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"definitely not audio").unwrap();

        let result = TagExtractor.extract(&path);
        assert!(matches!(result, Err(FileError::Tags(_))));
    }

    #[test]
    fn test_extract_front_cover_from_id3v2() {
        let dir = TempDir::new().unwrap();
        let cover = png_bytes(200, 150);
        let path = tagged_mp3(&dir, "song.mp3", vec![png_picture(PictureType::CoverFront, 200, 150)]);

        let pictures = TagExtractor.extract(&path).unwrap();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].kind, PictureKind::FrontCover);
        assert_eq!(pictures[0].mime_type.as_deref(), Some("image/png"));
        assert_eq!(pictures[0].data, cover);
    }

    #[test]
    fn test_extract_untagged_mp3_has_no_pictures() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bare.mp3");
        fs::write(&path, mpeg_frames()).unwrap();

        assert!(TagExtractor.extract(&path).unwrap().is_empty());
    }

    #[test]
    fn test_undefined_picture_reports_no_cover() {
        let dir = TempDir::new().unwrap();
        let path = tagged_mp3(
            &dir,
            "odd.mp3",
            vec![png_picture(PictureType::Undefined(0xFF), 500, 500)],
        );

        let pictures = TagExtractor.extract(&path).unwrap();
        assert_eq!(pictures.len(), 1);
        assert!(!pictures[0].is_picture());

        let report = threshold_pipeline().check(&path);
        match report.outcome {
            FileOutcome::Violation(v) => assert_eq!(v.fragments, vec![NO_COVER.to_string()]),
            other => panic!("expected a violation, got {other:?}"),
        }
    }

    #[test]
    fn test_small_embedded_cover_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = tagged_mp3(&dir, "small.mp3", vec![png_picture(PictureType::CoverFront, 200, 150)]);

        let report = threshold_pipeline().check(&path);
        match report.outcome {
            FileOutcome::Violation(v) => assert_eq!(v.message(), "Artwork image size is 200x150"),
            other => panic!("expected a violation, got {other:?}"),
        }
    }
}
