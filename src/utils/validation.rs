use axum::extract::FromRequest;

use crate::error::{AppError, AppResult};

/// `Json` extractor whose rejections become `AppError::BadRequest`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// A required text field: present and not blank. Returns the trimmed value.
pub fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Falta el campo requerido: {}", field)))
}

pub fn required_value<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::BadRequest(format!("Falta el campo requerido: {}", field)))
}
