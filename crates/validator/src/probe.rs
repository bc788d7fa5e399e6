//! Artwork decoding and size measurement.

use artsize_core::Resolution;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::FileError;

/// Result of probing one artwork payload.
#[derive(Debug)]
pub struct ProbedImage {
    pub dimensions: Resolution,
    /// Re-encoded size in whole kB, when requested. Measured separately
    /// from decoding so a failed re-encode does not hide the dimensions.
    pub size_kb: Option<Result<u64, FileError>>,
}

/// Decoder for raw artwork bytes.
pub trait ImageProbe {
    fn probe(&self, data: &[u8], measure_size: bool) -> Result<ProbedImage, FileError>;
}

/// Probe backed by the `image` crate. The payload is fully decoded, and the
/// size is measured by re-encoding the decoded pixels in the payload's own
/// format.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecProbe;

impl ImageProbe for CodecProbe {
    fn probe(&self, data: &[u8], measure_size: bool) -> Result<ProbedImage, FileError> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode().map_err(FileError::Decode)?;

        Ok(ProbedImage {
            dimensions: Resolution::new(image.width(), image.height()),
            size_kb: measure_size.then(|| reencoded_kb(&image, format)),
        })
    }
}

fn reencoded_kb(image: &DynamicImage, format: Option<ImageFormat>) -> Result<u64, FileError> {
    let format = format.ok_or(FileError::UnknownFormat)?;
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).map_err(FileError::Encode)?;
    Ok((buf.into_inner().len() as u64) >> 10)
}
