//! Uniform response envelope for service methods.

use serde::{Deserialize, Serialize};

use crate::paged::PagedResult;

/// `{ code, message, data }` returned by service methods that want a
/// consistent shape across success and failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: Some("success".to_string()),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>, code: u16) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::fail(message, 400)
    }

    pub fn unauthorized() -> Self {
        Self::fail("unauthorized", 401)
    }

    pub fn forbidden() -> Self {
        Self::fail("forbidden", 403)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::fail(message, 404)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl<T> ApiResponse<PagedResult<T>> {
    pub fn paged(items: Vec<T>, total: u64, page: u32, size: u32) -> Self {
        Self::ok(PagedResult::new(items, total, page, size))
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ApiResponse<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string(), 500),
        }
    }
}
