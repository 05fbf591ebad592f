/// Result alias that carries the custom [`CubeError`] type.
pub type Result<T> = std::result::Result<T, CubeError>;

/// Common error type for the core crate.
///
/// The engine itself never fails: premature or invalid calls are no-ops. Only
/// the text, file and DSP boundaries surface errors.
#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    /// Free-form message for conditions without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// A move token that is not a face letter optionally followed by `'`.
    #[error("invalid move notation `{0}`")]
    InvalidNotation(String),
    /// Input rejected before any work was done.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration file that is not valid JSON for [`crate::AppConfig`].
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Failure reported by the FFT backend.
    #[error("spectrum analysis failed: {0}")]
    Fft(#[from] realfft::FftError),
}

impl CubeError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for CubeError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for CubeError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
