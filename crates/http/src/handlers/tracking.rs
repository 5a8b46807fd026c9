use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use pixelpost_core::{TRACKING_PIXEL_CONTENT_TYPE, TRACKING_PIXEL_GIF};

use crate::AppState;

const PIXEL_CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate";

/// `GET /t/{token}`: records the first open and always answers with the pixel.
///
/// Lookup and store failures are logged; the response never changes.
pub async fn track_open(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = state.tracking_service.record_open(&token).await {
        tracing::warn!(error = %e, "failed to record tracking hit");
    }
    let pixel: &'static [u8] = &TRACKING_PIXEL_GIF;
    (
        [
            (header::CONTENT_TYPE, TRACKING_PIXEL_CONTENT_TYPE),
            (header::CACHE_CONTROL, PIXEL_CACHE_CONTROL),
        ],
        pixel,
    )
}
