/// Convenience result type used across slidecast.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

/// Top-level error taxonomy.
///
/// Every variant aborts the render of the scenario it was raised for. Degraded conditions
/// (missing background, missing narration, missing music, unsupported emoji) never surface as
/// errors; they are logged and replaced by their fallback.
#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    /// Invalid scenario or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required font is missing or cannot be registered.
    #[error("font error: {0}")]
    Font(String),

    /// Media probing, decoding or encoding failed.
    #[error("media error: {0}")]
    Media(String),

    /// Errors while evaluating the render pipeline.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    /// Build a [`SlidecastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlidecastError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`SlidecastError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`SlidecastError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`SlidecastError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
