//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable (logged, reported in the status line) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Image {0} is not in the current view")]
    NotInView(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ===== Fatal (startup) =====
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Config(_) | AppError::Init(_))
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => "Network unavailable, try again".to_string(),
            AppError::HttpStatus { status, .. } => format!("Server answered {}", status),
            AppError::ImageDecode(_) => "Cannot read image".to_string(),
            AppError::UnsupportedFormat(name) => format!("Not an image: {}", name),
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::Io(io) => AppError::Io(io),
            app_fs::FsError::NotAnImage(name) => AppError::UnsupportedFormat(name),
            other => AppError::Io(std::io::Error::other(other.to_string())),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::ImageDecode(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        match (e.status(), e.url()) {
            (Some(status), Some(url)) => AppError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            },
            _ => AppError::Network(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(AppError::Network("x".into()).is_recoverable());
        assert!(AppError::NotInView("1".into()).is_recoverable());
        assert!(!AppError::Init("x".into()).is_recoverable());
    }

    #[test]
    fn test_fs_mapping() {
        let e: AppError = app_fs::FsError::NotAnImage("a.txt".into()).into();
        assert!(matches!(e, AppError::UnsupportedFormat(ref n) if n == "a.txt"));
        assert_eq!(e.user_message(), "Not an image: a.txt");
    }
}
