//! Error types used by the crate.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum QuakeMapError {
    /// The feed request failed: transport error or non-success HTTP status.
    #[error("feed request failed: {0}")]
    Http(#[source] Box<ureq::Error>),
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The feed body is not a valid GeoJSON feature collection.
    #[error("failed to decode feed: {0}")]
    Decode(#[source] serde_json::Error),
    /// The map description could not be serialized into the page.
    #[error("failed to encode map description: {0}")]
    Encode(#[source] serde_json::Error),
    /// The host page has no element to mount the map into.
    #[error("mount target `#{0}` not found in host page")]
    MountTargetMissing(String),
    /// The map has already left the loading state.
    #[error("map is already rendered")]
    AlreadyRendered,
}

impl From<ureq::Error> for QuakeMapError {
    fn from(value: ureq::Error) -> Self {
        Self::Http(Box::new(value))
    }
}

/// Reason a single feed feature was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("feature coordinates need at least longitude and latitude, got {0} values")]
    ShortCoordinates(usize),
    #[error("feature property `{0}` is missing or null")]
    MissingProperty(&'static str),
    #[error("feature does not match the expected shape: {0}")]
    Shape(String),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, QuakeMapError>;
