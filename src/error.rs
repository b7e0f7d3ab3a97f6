use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Path escapes the shared folder")]
    PathEscape,

    #[error("Directory not found")]
    DirectoryNotFound,

    #[error("File not found")]
    FileNotFound,

    #[error("Target folder does not exist")]
    TargetMissing,

    #[error("No file part in the request")]
    MissingFilePart,

    #[error("No selected file")]
    EmptyFilename,

    #[error("File too large: upload exceeds limit of {limit} bytes")]
    FileTooLarge { limit: u64 },

    #[error("Malformed upload request: {0}")]
    Multipart(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("File upload failed")]
    UploadFailed(#[source] std::io::Error),
}

impl ShareError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShareError::PathEscape
            | ShareError::MissingFilePart
            | ShareError::EmptyFilename
            | ShareError::Multipart(_) => StatusCode::BAD_REQUEST,
            ShareError::DirectoryNotFound | ShareError::FileNotFound | ShareError::TargetMissing => {
                StatusCode::NOT_FOUND
            }
            ShareError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ShareError::Io(_) | ShareError::UploadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for ShareError {
    fn from(err: MultipartError) -> Self {
        ShareError::Multipart(err.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        let status = self.status();

        let details = match &self {
            ShareError::UploadFailed(err) => Some(err.to_string()),
            _ => None,
        };

        match &details {
            Some(details) => error!("Error uploading file: {}", details),
            None if status.is_server_error() => error!("{}", self),
            None => warn!("{}", self),
        }

        let body = ErrorResponse {
            error: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ShareError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, json) = body_json(ShareError::DirectoryNotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, serde_json::json!({ "error": "Directory not found" }));
    }

    #[tokio::test]
    async fn test_upload_failure_carries_details() {
        let err = ShareError::UploadFailed(std::io::Error::other("disk full"));
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "File upload failed");
        assert_eq!(json["details"], "disk full");
    }

    #[tokio::test]
    async fn test_io_error_uses_message() {
        let err = ShareError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "permission denied");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ShareError::PathEscape.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ShareError::EmptyFilename.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ShareError::MissingFilePart.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ShareError::TargetMissing.status(), StatusCode::NOT_FOUND);
        assert_eq!(ShareError::FileNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ShareError::FileTooLarge { limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
