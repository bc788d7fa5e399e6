use thiserror::Error;

/// A problem with one audio file. Reported inline; the scan moves on to
/// the next file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{0}")]
    Tags(#[from] lofty::error::LoftyError),

    #[error("could not decode artwork: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not re-encode artwork: {0}")]
    Encode(#[source] image::ImageError),

    #[error("artwork format not recognized")]
    UnknownFormat,

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
