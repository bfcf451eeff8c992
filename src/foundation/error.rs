/// Convenience result type used across Formatizer.
pub type FormatizerResult<T> = Result<T, FormatizerError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Degradation (a target falling back to a sparser content level) is never an error; it is
/// reported as warning strings on the per-target result instead.
#[derive(thiserror::Error, Debug)]
pub enum FormatizerError {
    /// Invalid snapshot, target, or job data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image or font could not be resolved or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while building or painting one target's scene.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding the rendered surface.
    #[error("export error: {0}")]
    Export(String),

    /// The batch was cancelled at a suspension point.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Errors when serializing or deserializing job files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FormatizerError {
    /// Build a [`FormatizerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FormatizerError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`FormatizerError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FormatizerError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`FormatizerError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Build a [`FormatizerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error came from a tripped cancel token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
