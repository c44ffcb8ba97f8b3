//! # Error Types
//!
//! Every fallible codec operation returns [`StegoError`]. Errors are raised at the point of
//! failure and never retried internally; prompting the user for a new auth code or a bigger
//! image is the caller's job.

/// Errors that can occur while hiding or recovering a message.
#[derive(Debug, thiserror::Error)]
pub enum StegoError {
    /// The message is empty or contains a character outside the single-byte range.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The framed message needs more bits than the image can carry.
    #[error("text is too large for this image: need {required} bits but only {capacity} available")]
    CapacityExceeded { required: u64, capacity: u64 },

    /// A user-supplied authentication code is not four decimal digits.
    #[error("invalid authentication code format: {0}")]
    InvalidAuthCode(String),

    /// The supplied authentication code does not match the one stored in the image.
    #[error("invalid authentication code")]
    AuthenticationError,

    /// The image container could not be decoded or re-encoded.
    #[error("image codec error: {0}")]
    ContainerCodec(#[from] image::ImageError),

    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file exists but could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StegoError>;
