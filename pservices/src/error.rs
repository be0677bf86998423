//! Collaborator failures shared by the weather and search clients.
//!
//! ```rust
//! use pservices::{ServiceError, ServiceErrorKind};
//!
//! let error = ServiceError::status("weather", 503, "upstream busy");
//! assert_eq!(error.kind, ServiceErrorKind::Status);
//! assert_eq!(error.status, Some(503));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    Timeout,
    Status,
    Transport,
    Malformed,
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub service: &'static str,
    pub message: String,
    pub status: Option<u16>,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, service: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            service,
            message: message.into(),
            status: None,
        }
    }

    pub fn timeout(service: &'static str, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Timeout, service, message)
    }

    pub fn status(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        let mut error = Self::new(ServiceErrorKind::Status, service, message);
        error.status = Some(status);
        error
    }

    pub fn transport(service: &'static str, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Transport, service, message)
    }

    pub fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Malformed, service, message)
    }

    pub fn unauthorized(service: &'static str, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unauthorized, service, message)
    }

    /// Classifies a reqwest send/body error.
    pub(crate) fn from_reqwest(service: &'static str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(service, error.to_string())
        } else if error.is_decode() {
            Self::malformed(service, error.to_string())
        } else {
            Self::transport(service, error.to_string())
        }
    }

    pub(crate) fn from_status(service: &'static str, status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::unauthorized(service, format!("{service} rejected credentials ({status})")),
            code => Self::status(service, code, format!("{service} returned {status}")),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} [{}]: {}", self.kind, self.service, self.message)
    }
}

impl Error for ServiceError {}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn credential_rejections_are_unauthorized() {
        let error = ServiceError::from_status("search", StatusCode::UNAUTHORIZED);
        assert_eq!(error.kind, ServiceErrorKind::Unauthorized);
        assert_eq!(error.status, None);
    }

    #[test]
    fn other_statuses_keep_their_code() {
        let error = ServiceError::from_status("weather", StatusCode::NOT_FOUND);
        assert_eq!(error.kind, ServiceErrorKind::Status);
        assert_eq!(error.status, Some(404));
        assert_eq!(error.to_string(), "Status [weather]: weather returned 404 Not Found");
    }
}
