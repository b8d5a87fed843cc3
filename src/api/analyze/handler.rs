// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Acne analysis endpoint handler

use axum::extract::State;
use axum::Json;
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use tracing::{debug, error, info, warn};

use super::request::AnalyzeRequest;
use super::response::AnalyzeResponse;
use crate::analysis::{unique_output_name, AcneAnalyzer};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::decode_image_bytes;

/// POST /analyze_acne/ - Grade acne severity in an uploaded photo
///
/// # Request (multipart/form-data)
/// - `name`: Patient name
/// - `age`: Integer age, 0-150
/// - `user_id`: Caller identifier, also used in the output file name
/// - `file`: Image (PNG, JPEG, WebP, GIF, BMP or TIFF)
///
/// # Response
/// Counts, total area, severity, annotated image URL and treatments.
///
/// # Errors
/// - 400 Bad Request: Invalid form or image
/// - 503 Service Unavailable: Detection model not loaded
/// - 500 Internal Server Error: Inference or file write failed
pub async fn analyze_acne_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        warn!("Rejected analyze request: {}", e);
        ApiError::InvalidRequest(e.to_string())
    })?;

    let max_upload_bytes = state.config.max_upload_bytes;

    // 1. Parse and validate the form
    let request = AnalyzeRequest::from_multipart(multipart, max_upload_bytes)
        .await
        .inspect_err(|e| warn!("Analyze validation failed: {}", e))?;

    debug!(
        "Analyze request for user {} ({} bytes, {:?})",
        request.user_id,
        request.file.len(),
        request.file_name
    );

    // 2. Get the detector
    let detector = state
        .get_vision_model_manager()
        .await
        .and_then(|manager| manager.get_detector())
        .ok_or_else(|| {
            warn!("Acne detection model not loaded");
            ApiError::ServiceUnavailable("Acne detection model not loaded".to_string())
        })?;

    // 3. Decode the upload
    let (image, image_info) = decode_image_bytes(&request.file, max_upload_bytes).map_err(|e| {
        warn!("Failed to decode upload: {}", e);
        ApiError::from(e)
    })?;

    debug!(
        "Decoded image: {}x{} {:?}",
        image_info.width, image_info.height, image_info.format
    );

    // 4. Detect, grade and annotate off the async runtime
    let analyzer = AcneAnalyzer::new(detector, state.annotator.clone(), state.thresholds.clone());
    let output_name = unique_output_name(&request.user_id);

    let result = tokio::task::spawn_blocking(move || analyzer.analyze(&image, &output_name))
        .await
        .map_err(|e| {
            error!("Analysis task failed: {}", e);
            ApiError::InternalError("Analysis task failed".to_string())
        })?
        .map_err(|e| {
            error!("Acne analysis failed: {:#}", e);
            ApiError::InternalError(format!("Acne analysis failed: {}", e))
        })?;

    let file_name = result
        .annotated_image_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApiError::InternalError("Annotated image has no file name".to_string()))?;

    // 5. Pick treatments and build the response
    let treatments = state.treatments.recommend(result.severity);

    info!(
        "Analyzed upload for {}: {} acne, {} pimples, severity {}",
        request.user_id, result.acne_count, result.pimple_count, result.severity
    );

    Ok(Json(AnalyzeResponse {
        name: request.name,
        age: request.age,
        user_id: request.user_id,
        acne_spots: result.acne_count,
        pimple_spots: result.pimple_count,
        total_acne_area: result.total_area,
        severity: result.severity,
        processed_image: state.config.processed_url(file_name),
        treatments,
    }))
}
