/**
 * Routes Module
 * API route handlers
 */

pub mod auth;
pub mod contact;
pub mod content;
pub mod health;
pub mod service_requests;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Success response (for delete)
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response for a newly stored record
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: Uuid,
}

/// Listing of admin records
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

fn non_blank(value: &str, message: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(message.to_string()));
    }
    Ok(trimmed.to_string())
}

fn require_email(value: &str) -> Result<String, ApiError> {
    let email = non_blank(value, "Email is required")?;
    if !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }
    Ok(email)
}
