//! Error types for the captioning pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// One failed call to the inference service. Always retryable by the controller.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Failed to read image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Inference service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Inference service request failed: {0}")]
    Transport(String),

    #[error("Malformed response from inference service: {0}")]
    MalformedResponse(String),
}

/// Terminal, per-file failures after the inference step. None of these stop the batch.
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("Generated filename is empty after sanitization")]
    SanitizationEmpty,

    #[error("Could not find available filename after {attempts} attempts")]
    RenameCollisionExhausted { attempts: usize },

    #[error("Failed to rename file: {0}")]
    RenameIo(#[source] io::Error),

    #[error("Failed to write caption {}: {source}", path.display())]
    CaptionWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write error log {}: {source}", path.display())]
    ErrorLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CaptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_messages() {
        let err = GatewayError::Status {
            status: 503,
            body: "model loading".to_string(),
        };
        assert_eq!(err.to_string(), "Inference service returned HTTP 503: model loading");

        let err = GatewayError::ImageRead {
            path: PathBuf::from("/shots/a.png"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/shots/a.png"));
    }

    #[test]
    fn test_caption_error_messages_match_log_wording() {
        assert_eq!(
            CaptionError::SanitizationEmpty.to_string(),
            "Generated filename is empty after sanitization"
        );
        assert_eq!(
            CaptionError::RenameCollisionExhausted { attempts: 1000 }.to_string(),
            "Could not find available filename after 1000 attempts"
        );
        let err = CaptionError::RenameIo(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(err.to_string().starts_with("Failed to rename file: "));
    }
}
