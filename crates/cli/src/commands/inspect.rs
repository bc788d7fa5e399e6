use anyhow::{Context, Result};
use artsize_validator::{CodecProbe, CoverExtractor, EmbeddedPicture, ImageProbe, TagExtractor};
use std::path::PathBuf;

/// Print every embedded picture of one file without applying any checks
pub fn run(path: PathBuf) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("Audio file does not exist: {}", path.display());
    }

    let pictures = TagExtractor
        .extract(&path)
        .with_context(|| format!("Failed to read tags from {}", path.display()))?;

    println!("🔍 {}", path.display());

    if pictures.is_empty() {
        println!("   No embedded pictures");
        return Ok(());
    }

    for (idx, picture) in pictures.iter().enumerate() {
        println!("   #{} {}", idx + 1, describe_picture(picture, &CodecProbe));
    }

    Ok(())
}

fn describe_picture(picture: &EmbeddedPicture, probe: &impl ImageProbe) -> String {
    let mime = picture.mime_type.as_deref().unwrap_or("unknown type");
    let header = format!("{:?} ({}, {} bytes)", picture.kind, mime, picture.data.len());

    match probe.probe(&picture.data, true) {
        Ok(probed) => {
            let size = match probed.size_kb {
                Some(Ok(kb)) => format!("{} kB re-encoded", kb),
                Some(Err(err)) => format!("size unknown: {}", err),
                None => "size not measured".to_string(),
            };
            format!("{}: {}, {}", header, probed.dimensions, size)
        }
        Err(err) => format!("{}: {}", header, err),
    }
}
