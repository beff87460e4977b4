//! AWS API error types

use stratus_cloud::CloudError;
use thiserror::Error;

/// Failure reported by an AWS API call
///
/// SDK-neutral so the API traits can be implemented by in-memory fakes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed{}", detail(.status, .code, .message))]
pub struct ServiceError {
    /// Operation name (e.g., "HeadObject")
    pub operation: &'static str,

    /// Remote error code (e.g., "BadRequestException")
    pub code: Option<String>,

    /// Remote error message
    pub message: Option<String>,

    /// HTTP status of the raw response, when one was received
    pub status: Option<u16>,
}

impl ServiceError {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            code: None,
            message: None,
            status: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_http_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    pub fn message_contains(&self, needle: &str) -> bool {
        self.message.as_deref().is_some_and(|m| m.contains(needle))
    }
}

/// ` (HTTP <status>): <code>: <message>`, omitting absent parts
fn detail(status: &Option<u16>, code: &Option<String>, message: &Option<String>) -> String {
    let mut out = String::new();
    if let Some(status) = status {
        out.push_str(&format!(" (HTTP {})", status));
    }
    match (code, message) {
        (Some(code), Some(message)) => out.push_str(&format!(": {}: {}", code, message)),
        (Some(code), None) => out.push_str(&format!(": {}", code)),
        (None, Some(message)) => out.push_str(&format!(": {}", message)),
        (None, None) => {}
    }
    out
}

impl From<ServiceError> for CloudError {
    fn from(err: ServiceError) -> Self {
        CloudError::ApiError(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ServiceError::new("HeadObject")
            .with_status(403)
            .with_code("AccessDenied")
            .with_message("Access Denied");
        assert_eq!(
            err.to_string(),
            "HeadObject failed (HTTP 403): AccessDenied: Access Denied"
        );
        assert_eq!(ServiceError::new("PutObject").to_string(), "PutObject failed");
        assert_eq!(
            ServiceError::new("HeadObject").with_status(404).to_string(),
            "HeadObject failed (HTTP 404)"
        );
        assert_eq!(
            ServiceError::new("DescribeKey").with_message("timed out").to_string(),
            "DescribeKey failed: timed out"
        );

        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(ServiceError::new("ListInvitations").with_code("InternalServerErrorException"));
        assert!(boxed.to_string().ends_with(": InternalServerErrorException"));
    }

    #[test]
    fn test_into_cloud_error() {
        let err: CloudError = ServiceError::new("DeleteObject").with_code("NoSuchBucket").into();
        assert!(matches!(err, CloudError::ApiError(ref m) if m.contains("NoSuchBucket")));
    }

    #[test]
    fn test_predicates() {
        let err = ServiceError::new("GetMasterAccount")
            .with_code("BadRequestException")
            .with_message("The request is rejected because the input detectorId is not owned by the current account.")
            .with_status(400);
        assert!(err.is_code("BadRequestException"));
        assert!(err.message_contains("not owned by the current account"));
        assert!(!err.is_http_not_found());
        assert!(ServiceError::new("HeadObject").with_status(404).is_http_not_found());
    }
}
