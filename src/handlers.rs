use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::audit::{self, AuditAction, ClientAddr};
use crate::error::ShareError;
use crate::{listing, resolver, transfer, AppState};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Directory listing response
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub path: String,
    pub files: Vec<String>,
    pub directories: Vec<String>,
}

/// Upload query parameters
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Target directory relative to the shared root
    #[serde(default)]
    pub path: String,
}

/// Response for a stored upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub filename: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - List the shared root
pub async fn list_root(
    State(state): State<AppState>,
    client: ClientAddr,
) -> Result<Response, ShareError> {
    browse(&state, &client, String::new()).await
}

/// GET /{*subpath} - List a directory or download a file
pub async fn browse_path(
    State(state): State<AppState>,
    client: ClientAddr,
    Path(subpath): Path<String>,
) -> Result<Response, ShareError> {
    browse(&state, &client, subpath).await
}

async fn browse(
    state: &AppState,
    client: &ClientAddr,
    subpath: String,
) -> Result<Response, ShareError> {
    let target = state.root.resolve(&subpath)?;

    let metadata = match fs::metadata(&target).await {
        Ok(m) => m,
        Err(e) if resolver::is_missing(&e) => return Err(ShareError::DirectoryNotFound),
        Err(e) => return Err(ShareError::Io(e)),
    };

    if !metadata.is_dir() {
        audit::record(client, AuditAction::DownloadFile, Some(&subpath));
        return transfer::download(&target).await;
    }

    audit::record(client, AuditAction::ListFolder, Some(&subpath));
    debug!("Listing directory: {}", target.display());

    let contents = listing::list(&target).await?;

    Ok(Json(ListingResponse {
        path: subpath,
        files: contents.files,
        directories: contents.directories,
    })
    .into_response())
}

/// POST /upload?path=<subpath> - Store the multipart `file` field in a directory
pub async fn upload_file(
    State(state): State<AppState>,
    client: ClientAddr,
    Query(query): Query<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ShareError> {
    let target_dir = state.root.resolve(&query.path)?;

    match fs::metadata(&target_dir).await {
        Ok(m) if m.is_dir() => {}
        Ok(_) => return Err(ShareError::TargetMissing),
        Err(e) if resolver::is_missing(&e) => return Err(ShareError::TargetMissing),
        Err(e) => return Err(ShareError::Io(e)),
    }

    let mut multipart = multipart.map_err(|e| {
        debug!("Rejected upload body: {}", e);
        ShareError::MissingFilePart
    })?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        // A `file` field without a filename is a plain form value
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let saved = transfer::upload(
            &target_dir,
            &filename,
            field,
            state.config.max_upload_size,
        )
        .await?;

        let logged_path = join_subpath(&query.path, &saved.filename);
        audit::record(&client, AuditAction::UploadFile, Some(&logged_path));

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "File uploaded successfully",
                filename: saved.filename,
            }),
        ));
    }

    Err(ShareError::MissingFilePart)
}

/// GET /index - Landing page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

fn join_subpath(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
