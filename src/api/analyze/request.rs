// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart form parsing and validation

use axum::http::StatusCode;
use axum_extra::extract::multipart::{Field, MultipartError};
use axum_extra::extract::Multipart;
use tracing::debug;

use crate::api::errors::ApiError;

/// Oldest accepted age
pub const MAX_AGE: i64 = 150;

/// A validated analysis request
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub name: String,
    pub age: u32,
    pub user_id: String,
    /// Raw upload bytes, decoded later
    pub file: Vec<u8>,
    /// Client-supplied file name, for logs only
    pub file_name: Option<String>,
}

/// Form fields as they arrive, before validation
#[derive(Debug, Default)]
pub struct RawAnalyzeForm {
    pub name: Option<String>,
    pub age: Option<String>,
    pub user_id: Option<String>,
    pub file: Option<Vec<u8>>,
    pub file_name: Option<String>,
}

impl AnalyzeRequest {
    /// Read every form field, then validate
    ///
    /// The file part is streamed and rejected as soon as it exceeds
    /// `max_upload_bytes`.
    pub async fn from_multipart(
        mut multipart: Multipart,
        max_upload_bytes: usize,
    ) -> Result<Self, ApiError> {
        let mut form = RawAnalyzeForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_upload_bytes))?
        {
            let Some(field_name) = field.name().map(str::to_string) else {
                continue;
            };

            match field_name.as_str() {
                "name" => form.name = Some(read_text(field, max_upload_bytes).await?),
                "age" => form.age = Some(read_text(field, max_upload_bytes).await?),
                "user_id" => form.user_id = Some(read_text(field, max_upload_bytes).await?),
                "file" => {
                    form.file_name = field.file_name().map(str::to_string);
                    form.file = Some(read_file(field, max_upload_bytes).await?);
                }
                other => debug!("Ignoring unexpected form field '{}'", other),
            }
        }

        form.validate()
    }
}

impl RawAnalyzeForm {
    pub fn validate(self) -> Result<AnalyzeRequest, ApiError> {
        let name = required_text(self.name, "name")?;
        let user_id = required_text(self.user_id, "user_id")?;

        let age_text = required_text(self.age, "age")?;
        let age: i64 = age_text
            .trim()
            .parse()
            .map_err(|_| ApiError::validation("age", format!("age must be an integer, got '{}'", age_text)))?;
        if !(0..=MAX_AGE).contains(&age) {
            return Err(ApiError::validation(
                "age",
                format!("age must be between 0 and {}", MAX_AGE),
            ));
        }

        let file = match self.file {
            Some(bytes) if !bytes.is_empty() => bytes,
            Some(_) => return Err(ApiError::validation("file", "file is empty")),
            None => return Err(ApiError::validation("file", "file is required")),
        };

        Ok(AnalyzeRequest {
            name,
            age: age as u32,
            user_id,
            file,
            file_name: self.file_name,
        })
    }
}

/// Blank values are rejected; accepted values are kept as sent
fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::validation(field, format!("{} is required", field))),
    }
}

async fn read_text(field: Field, limit: usize) -> Result<String, ApiError> {
    field.text().await.map_err(|e| multipart_error(e, limit))
}

async fn read_file(mut field: Field, limit: usize) -> Result<Vec<u8>, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
        if data.len() + chunk.len() > limit {
            return Err(ApiError::PayloadTooLarge { limit });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::InvalidRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}
