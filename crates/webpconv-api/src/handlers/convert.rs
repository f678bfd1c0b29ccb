use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::Response,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use webpconv_core::{AppError, PackagedOutput, UploadItem};

use crate::error::HttpAppError;
use crate::state::AppState;

pub const CONVERTED_COUNT_HEADER: HeaderName = HeaderName::from_static("x-converted-count");
pub const FAILED_COUNT_HEADER: HeaderName = HeaderName::from_static("x-failed-count");
pub const FAILED_FILES_HEADER: HeaderName = HeaderName::from_static("x-failed-files");

/// Bytes escaped in the failed-files header; `,` separates names.
const HEADER_LIST: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b',')
    .add(b';')
    .add(b'\\');

/// Convert uploaded WebP images and archives to JPEG
///
/// Reads every file part of the multipart body, runs the batch on the blocking
/// pool and returns either the lone JPEG or `converted.zip`.
///
/// # Errors
/// - `AppError::InvalidInput` - No file parts, or an unreadable multipart body
/// - `AppError::PayloadTooLarge` - Upload exceeds `MAX_UPLOAD_SIZE`
/// - `AppError::NoValidFiles` - Nothing in the upload is a WebP image or archive
/// - `AppError::AllConversionsFailed` - Every candidate image failed
#[tracing::instrument(skip(state, multipart), fields(operation = "convert"))]
pub async fn convert(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let items = read_uploads(&mut multipart).await?;
    if items.is_empty() {
        return Err(AppError::InvalidInput("No files uploaded".to_string()).into());
    }

    let started = Instant::now();
    let upload_bytes: usize = items.iter().map(UploadItem::size).sum();
    tracing::info!(
        files = items.len(),
        upload_bytes,
        "Received conversion request"
    );

    let pipeline = state.pipeline;
    let packager = state.packager;
    let size_limit = state.config.max_upload_size;
    let output = tokio::task::spawn_blocking(move || {
        let outcome = pipeline.run(items, size_limit)?;
        packager.package(outcome)
    })
    .await
    .map_err(|e| AppError::InternalWithSource {
        message: "Conversion task failed".to_string(),
        source: e.into(),
    })??;

    tracing::info!(
        output = %output.name(),
        converted = output.converted_count(),
        failed = output.failures().len(),
        output_bytes = output.data().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Conversion request completed"
    );

    build_response(output)
}

/// Collect every part that carries a non-empty filename.
async fn read_uploads(multipart: &mut Multipart) -> Result<Vec<UploadItem>, HttpAppError> {
    let mut items = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            tracing::debug!(field = ?field.name(), "Ignoring non-file form field");
            continue;
        };
        if file_name.is_empty() {
            continue;
        }

        let data = field.bytes().await?;
        tracing::debug!(file = %file_name, bytes = data.len(), "Read uploaded file");
        items.push(UploadItem::new(file_name, data));
    }

    Ok(items)
}

fn build_response(output: PackagedOutput) -> Result<Response, HttpAppError> {
    let failures = output.failures();
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, output.content_type())
        .header(header::CONTENT_DISPOSITION, content_disposition(output.name()))
        .header(CONVERTED_COUNT_HEADER, output.converted_count())
        .header(FAILED_COUNT_HEADER, failures.len());

    if !failures.is_empty() {
        let names = failures
            .iter()
            .map(|f| utf8_percent_encode(&f.input_name, HEADER_LIST).to_string())
            .collect::<Vec<_>>()
            .join(",");
        builder = builder.header(FAILED_FILES_HEADER, names);
    }

    builder
        .body(Body::from(output.data().clone()))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            AppError::Internal(e.to_string()).into()
        })
}

/// `attachment` disposition; non-ASCII names also get an RFC 5987 `filename*`.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if fallback == name {
        format!("attachment; filename=\"{}\"", name)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(name, NON_ALPHANUMERIC)
        )
    }
}
