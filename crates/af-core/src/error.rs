use serde::Serialize;
use thiserror::Error;

/// Errors a single render can fail with.
///
/// Everything here is scoped to one request: the process never aborts on it.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The input bytes could not be decoded as an image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Ramp resolved to zero glyphs.
    #[error("empty charset: a ramp needs at least one glyph")]
    EmptyCharset,

    /// Numeric or structural field out of its accepted range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Configuration field name.
        field: &'static str,
        /// Human readable reason.
        reason: String,
    },

    /// String did not name any variant of a closed enumeration.
    #[error("unknown {field} `{value}` (expected one of: {expected})")]
    UnknownVariant {
        /// Configuration field name.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Accepted spellings, comma separated.
        expected: &'static str,
    },

    /// Grid or canvas dimensions outside the supported range.
    #[error("invalid dimensions: {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Output encoding failed.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True for caller mistakes (bad bytes, bad configuration).
    ///
    /// # Example
    /// ```
    /// use af_core::CoreError;
    /// assert!(CoreError::EmptyCharset.is_input_error());
    /// assert!(!CoreError::Encode("png".into()).is_input_error());
    /// ```
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidImage(_)
                | Self::EmptyCharset
                | Self::InvalidValue { .. }
                | Self::UnknownVariant { .. }
                | Self::InvalidDimensions { .. }
        )
    }

    /// Short machine-oriented category, used as the `error` field of responses.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidImage(_) => "invalid image",
            Self::EmptyCharset => "empty charset",
            Self::InvalidValue { .. } | Self::UnknownVariant { .. } => "invalid parameter",
            Self::InvalidDimensions { .. } => "invalid dimensions",
            Self::Encode(_) => "encoding failed",
            Self::Io(_) => "io error",
        }
    }
}

/// Structured error payload handed back to callers.
///
/// # Example
/// ```
/// use af_core::error::{CoreError, ErrorResponse};
/// let resp = ErrorResponse::from(&CoreError::InvalidImage("truncated".into()));
/// assert_eq!(resp.status(), 400);
/// assert_eq!(resp.error, "invalid image");
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error category.
    pub error: String,
    /// Full message.
    pub detail: String,
    #[serde(skip)]
    input: bool,
}

impl ErrorResponse {
    /// HTTP-equivalent status code: 400 for input errors, 500 otherwise.
    #[must_use]
    pub fn status(&self) -> u16 {
        if self.input { 400 } else { 500 }
    }

    /// Response for failures outside [`CoreError`] (status 500).
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            error: "internal error".to_string(),
            detail: detail.into(),
            input: false,
        }
    }

    /// Serialize as a single-line JSON object.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!("{{\"error\":\"{}\",\"detail\":\"\"}}", self.error)
        })
    }
}

impl From<&CoreError> for ErrorResponse {
    fn from(err: &CoreError) -> Self {
        let detail = match err {
            CoreError::InvalidImage(d) => d.clone(),
            other => other.to_string(),
        };
        Self {
            error: err.kind().to_string(),
            detail,
            input: err.is_input_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_image_maps_to_400() {
        let resp = ErrorResponse::from(&CoreError::InvalidImage("bad magic".into()));
        assert_eq!(resp.status(), 400);
        assert_eq!(resp.detail, "bad magic");
        assert_eq!(resp.to_json(), r#"{"error":"invalid image","detail":"bad magic"}"#);
    }

    #[test]
    fn io_error_maps_to_500() {
        let err = CoreError::from(std::io::Error::other("disk"));
        assert_eq!(ErrorResponse::from(&err).status(), 500);
    }
}
