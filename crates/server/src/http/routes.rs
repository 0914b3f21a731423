//! Request handlers.
//!
//! Handlers only translate between HTTP and the access core: every path a
//! client sends goes through `access` resolution before the filesystem is
//! touched. Resolution does blocking filesystem I/O, so it runs on the
//! blocking thread pool.

use std::path::PathBuf;

use access::{list, resolve_download, resolve_upload_target, Entry, ShareError};
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::header::{
    CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, HOST, LOCATION,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use http_body_util::LengthLimitError;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::info;

use super::error::ApiError;
use super::render::{encode_path, ListingPage};
use super::state::AppState;

/// Query parameters of the listing page.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams {
    /// Relative path to browse; empty means the root.
    #[serde(default)]
    pub path: String,
}

/// Run a blocking access-core call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<access::Result<T>, ApiError>
where
    F: FnOnce() -> access::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(ApiError::internal)
}

/// Directory listing page.
///
/// Route: GET /?path=<relative>
pub async fn browse(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
    headers: HeaderMap,
) -> Result<Html<String>, ApiError> {
    let root = state.root.clone();
    let relative = params.path.clone();
    let entries: Vec<Entry> = blocking(move || list(&root, &relative))
        .await?
        .map_err(ApiError::lookup)?;

    let upload_token = params.path.is_empty().then(|| state.tokens.get());
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    Ok(Html(
        ListingPage {
            path: &params.path,
            entries: &entries,
            upload_token: upload_token.as_deref(),
            host,
        }
        .render(),
    ))
}

/// Stream a file as an attachment.
///
/// Route: GET /download/*file_path
pub async fn download(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> Result<Response, ApiError> {
    let root = state.root.clone();
    let relative = file_path.clone();
    let absolute: PathBuf = blocking(move || resolve_download(&root, &relative))
        .await?
        .map_err(ApiError::lookup)?;

    let file = tokio::fs::File::open(&absolute)
        .await
        .map_err(|e| ApiError::lookup(e.into()))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::lookup(e.into()))?
        .len();

    let name = absolute
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = mime_guess::from_path(&absolute).first_or_octet_stream();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime.as_ref())
        .header(CONTENT_LENGTH, length)
        .header(CONTENT_DISPOSITION, content_disposition(&name))
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(ApiError::internal)?;

    Ok(response)
}

/// Store the request body at the given path.
///
/// The token is checked before any of the body is read; the body is then
/// buffered up to the configured upload limit.
///
/// Route: PUT /upload/:token/*file_path
pub async fn upload(
    State(state): State<AppState>,
    Path((token, file_path)): Path<(String, String)>,
    body: Body,
) -> Result<Response, ApiError> {
    let grant = state.tokens.authorize(&token).map_err(ApiError::upload)?;
    let body = read_body(body, state.max_upload_size).await?;

    let root = state.root.clone();
    let relative = file_path.clone();
    let target = blocking(move || resolve_upload_target(&root, &relative))
        .await?
        .map_err(ApiError::upload)?;

    tokio::fs::write(&target, &body)
        .await
        .map_err(|e| ApiError::upload(ShareError::Io(e)))?;
    info!("Stored {} bytes at {:?}", body.len(), file_path);

    if let Some(next) = state.tokens.complete(&grant) {
        info!(
            "Upload token rotated after use. Include it in path: /upload/{}/<file>",
            next
        );
    }

    let location = format!("/download/{}", encode_path(&file_path));
    Ok((StatusCode::CREATED, [(LOCATION, location)]).into_response())
}

/// Buffer a request body of at most `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        let inner = e.into_inner();
        if inner.downcast_ref::<LengthLimitError>().is_some() {
            ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Upload exceeds the size limit")
        } else {
            ApiError::new(StatusCode::BAD_REQUEST, "Failed to read request body")
        }
    })
}

/// Serve `favicon.ico` from the static directory.
///
/// Route: GET /favicon.ico
pub async fn favicon(State(state): State<AppState>) -> Result<Response, ApiError> {
    let path = state.static_dir.join("favicon.ico");
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(CONTENT_TYPE, "image/x-icon")], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::new(StatusCode::NOT_FOUND, "Favicon not found"))
        }
        Err(e) => Err(ApiError::internal(e)),
    }
}

/// `Content-Disposition` value for downloading a file named `name`.
///
/// Plain ASCII names are quoted directly; anything else uses the RFC 5987
/// extended form.
pub fn content_disposition(name: &str) -> HeaderValue {
    let plain = name
        .chars()
        .all(|c| (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\');

    let value = if plain {
        format!("attachment; filename=\"{name}\"")
    } else {
        format!("attachment; filename*=utf-8''{}", urlencoding::encode(name))
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_plain() {
        assert_eq!(
            content_disposition("report 2024.pdf"),
            "attachment; filename=\"report 2024.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_extended() {
        assert_eq!(
            content_disposition("résumé.txt"),
            "attachment; filename*=utf-8''r%C3%A9sum%C3%A9.txt"
        );
        assert_eq!(
            content_disposition("say \"hi\".txt"),
            "attachment; filename*=utf-8''say%20%22hi%22.txt"
        );
    }
}
