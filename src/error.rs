use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No `*.xml` file exists under the source root
    #[error("no XML files found under {0}")]
    NoInput(PathBuf),

    /// Files were found but none produced a usable (image, boxes) pair
    #[error("no valid (image, label) pairs parsed under {0}; check paths and permissions")]
    NoValidRecords(PathBuf),

    #[error("validation fraction {0} is not strictly between 0 and 1")]
    InvalidValFraction(f64),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize dataset descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to build parser thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Why a single annotation file produced no record.
///
/// These never abort a run; they are counted and reported in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("malformed annotation: {0}")]
    MalformedXml(String),

    #[error("declared image size {width}x{height} is not usable")]
    InvalidSize { width: u32, height: u32 },

    #[error("no image file found next to the annotation")]
    MissingImage,

    #[error("annotation has no complete bounding box")]
    NoBoxes,
}

/// Failures of the synthetic composite generator.
#[derive(Debug, Error)]
pub enum SynthError {
    /// A source folder had no decodable image
    #[error("no readable images in {0}; check file types and permissions")]
    NoImages(PathBuf),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
