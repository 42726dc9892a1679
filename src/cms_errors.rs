//! # CMS Error Types Module
//!
//! This module defines the error types used at the Strapi CMS boundary.
//! Every CMS failure surfaces as one of these variants so the dispatcher
//! can map it to a user-visible "try again later" message.

/// Custom error types for CMS operations
#[derive(Debug, Clone)]
pub enum CmsError {
    /// Transport-level failures (connect, timeout, DNS)
    Unreachable(String),
    /// Non-success HTTP status from the CMS
    Status(u16),
    /// Requested product document id does not exist
    NotFound(String),
    /// Response payload did not match the expected Strapi shape
    Malformed(String),
}

impl std::fmt::Display for CmsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CmsError::Unreachable(msg) => write!(f, "CMS unreachable: {msg}"),
            CmsError::Status(code) => write!(f, "CMS returned status {code}"),
            CmsError::NotFound(id) => write!(f, "Product {id} not found"),
            CmsError::Malformed(msg) => write!(f, "Malformed CMS payload: {msg}"),
        }
    }
}

impl std::error::Error for CmsError {}

impl From<reqwest::Error> for CmsError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            CmsError::Status(status.as_u16())
        } else if err.is_decode() {
            CmsError::Malformed(err.to_string())
        } else {
            CmsError::Unreachable(err.to_string())
        }
    }
}
