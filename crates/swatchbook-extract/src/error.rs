//! Error types for the extraction client.
//!
//! None of these escape `ImaggaClient::generate_palette_from_image`; they
//! are logged and normalized to the fallback palette. `ImageAccess` is the
//! exception: it is raised while loading an image, before extraction starts.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Upload finished without an upload id.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Non-success HTTP status from the API.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Extraction succeeded but returned no usable colors.
    #[error("No colors found in response")]
    EmptyResult,

    /// Transport-level failure (DNS, connect, TLS, body read).
    #[error("Request failed: {0}")]
    Network(String),

    /// Usage probe reported the API as unavailable.
    #[error("API status check failed: {0}")]
    Status(String),

    /// The image could not be read from disk.
    #[error("Image access denied: {0}")]
    ImageAccess(String),
}

impl Error {
    /// HTTP 403 responses whose message points at a concurrency or rate limit.
    ///
    /// These are the only failures the retry policy retries.
    pub fn is_concurrency_limited(&self) -> bool {
        match self {
            Self::Http { status: 403, message } => {
                let lower = message.to_lowercase();
                lower.contains("concurrent") || lower.contains("limit")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
