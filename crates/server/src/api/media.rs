//! `/convert` and `/clip` handlers.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use mediacut_core::{parse_clip_specs, ClipArchive, ConvertedAudio, UploadedVideo};

use super::error::ApiError;
use crate::state::AppState;

/// Name used when the sanitized download name ends up empty.
const FALLBACK_DOWNLOAD_NAME: &str = "download";

/// Fields read from a media upload form.
#[derive(Debug, Default)]
struct MediaForm {
    file: Option<UploadedVideo>,
    clips: Option<String>,
}

/// Read the multipart body. Fields other than `file` and `clips` are skipped.
async fn read_form(mut multipart: Multipart) -> Result<MediaForm, ApiError> {
    let mut form = MediaForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                form.file = Some(UploadedVideo::new(filename, content_type, data.to_vec()));
            }
            Some("clips") => {
                form.clips = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn require_file(form: &mut MediaForm) -> Result<UploadedVideo, ApiError> {
    match form.file.take() {
        Some(file) if !file.data.is_empty() => Ok(file),
        _ => Err(ApiError::bad_request("No file uploaded")),
    }
}

/// POST /convert
pub async fn convert(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let span = info_span!("convert", request_id = %Uuid::new_v4());

    async move {
        let mut form = read_form(multipart).await?;
        let upload = require_file(&mut form)?;
        info!(
            "Converting {:?} ({} bytes)",
            upload.filename.as_deref().unwrap_or("<unnamed>"),
            upload.data.len()
        );

        let audio = state.processor().convert(upload).await?;
        info!("Returning {} ({} bytes)", audio.filename, audio.data.len());
        Ok(attachment(ConvertedAudio::MEDIA_TYPE, &audio.filename, audio.data))
    }
    .instrument(span)
    .await
}

/// POST /clip
pub async fn clip(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let span = info_span!("clip", request_id = %Uuid::new_v4());

    async move {
        let mut form = read_form(multipart).await?;
        let upload = require_file(&mut form)?;
        let raw = form
            .clips
            .ok_or_else(|| ApiError::bad_request("No clips provided"))?;
        let clips = parse_clip_specs(&raw).map_err(mediacut_core::ProcessError::from)?;
        info!(
            "Clipping {:?} ({} bytes) into {} clip(s)",
            upload.filename.as_deref().unwrap_or("<unnamed>"),
            upload.data.len(),
            clips.len()
        );

        let archive = state.processor().clip(upload, clips).await?;
        info!(
            "Returning {} with {} entries ({} bytes)",
            archive.filename,
            archive.entries.len(),
            archive.data.len()
        );
        Ok(attachment(ClipArchive::MEDIA_TYPE, &archive.filename, archive.data))
    }
    .instrument(span)
    .await
}

fn attachment(media_type: &'static str, filename: &str, data: Vec<u8>) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_download_name(filename)
    );
    (
        [
            (header::CONTENT_TYPE, media_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response()
}

/// Reduce a download name to printable ASCII without quotes or backslashes.
fn sanitize_download_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        FALLBACK_DOWNLOAD_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
