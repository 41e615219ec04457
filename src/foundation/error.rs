/// Convenience result type used across imagehelper.
pub type ImageResult<T> = Result<T, ImageError>;

/// Error taxonomy shared by factories, transforms, the drawing context and the remote cache.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Degenerate geometry or an unsupported pixel-format combination.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// A crop rectangle outside the source bounds.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// The codec could not parse the supplied bytes.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// Transport-level failure while fetching bytes.
    #[error("fetch failure: {0}")]
    FetchFailure(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImageError {
    /// Build an [`ImageError::InvalidImage`] value.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Build an [`ImageError::InvalidBounds`] value.
    pub fn invalid_bounds(msg: impl Into<String>) -> Self {
        Self::InvalidBounds(msg.into())
    }

    /// Build an [`ImageError::DecodeFailure`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailure(msg.into())
    }

    /// Build an [`ImageError::FetchFailure`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::FetchFailure(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
