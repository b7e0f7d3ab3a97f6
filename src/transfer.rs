//! File download and upload.

use std::io;
use std::path::{Path, PathBuf};

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::{pin_mut, Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::error::ShareError;

/// Longest filename accepted from a client, in bytes.
const MAX_FILENAME_LEN: usize = 255;

/// A file written by [`upload`].
#[derive(Debug, Clone)]
pub struct SavedFile {
    /// Sanitized name the content was stored under
    pub filename: String,
    /// Absolute destination path
    pub path: PathBuf,
    /// Bytes written
    pub size: u64,
}

/// Stream `path` back to the client as an attachment.
///
/// Uses streaming to handle large files without loading them into memory.
pub async fn download(path: &Path) -> Result<Response, ShareError> {
    let file = match fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("File vanished before open: {}", path.display());
            return Err(ShareError::FileNotFound);
        }
        Err(e) => return Err(ShareError::Io(e)),
    };

    let file_size = file.metadata().await.map_err(ShareError::Io)?.len();

    debug!("Streaming file: {} ({} bytes)", path.display(), file_size);

    let body = Body::from_stream(ReaderStream::new(file));

    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_LENGTH, file_size.to_string()),
            (header::CONTENT_DISPOSITION, attachment_disposition(&file_name)),
        ],
        body,
    )
        .into_response())
}

/// Build a `Content-Disposition: attachment` value that is always a valid header.
///
/// Non-ASCII names get an ASCII fallback plus an RFC 5987 `filename*` parameter.
fn attachment_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if file_name.is_ascii() {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(file_name)
        )
    }
}

/// Sanitize a client-supplied filename.
/// Returns None if nothing usable remains.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    // Leading dots would allow "." and ".." or hidden names
    let sanitized = sanitized.trim_matches(|c| c == '.' || c == ' ');

    if sanitized.is_empty() {
        return None;
    }

    if sanitized.len() <= MAX_FILENAME_LEN {
        return Some(sanitized.to_string());
    }

    let mut end = MAX_FILENAME_LEN;
    while !sanitized.is_char_boundary(end) {
        end -= 1;
    }
    Some(sanitized[..end].to_string())
}

/// Write `content` to `target_dir/filename`, replacing any existing file.
///
/// The content is staged in a temporary file inside `target_dir` and renamed into place
/// once complete, so a failed or oversized upload never leaves a partial file behind.
pub async fn upload<S, E>(
    target_dir: &Path,
    filename: &str,
    content: S,
    max_size: u64,
) -> Result<SavedFile, ShareError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<ShareError>,
{
    let file_name = sanitize_filename(filename).ok_or_else(|| {
        debug!("Rejected upload filename {:?}", filename);
        ShareError::EmptyFilename
    })?;

    let dest = target_dir.join(&file_name);

    let staged = tempfile::Builder::new()
        .prefix(".dirshare-upload-")
        .tempfile_in(target_dir)
        .map_err(ShareError::UploadFailed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(ShareError::UploadFailed)?;
    }

    let mut file = fs::File::from_std(staged.reopen().map_err(ShareError::UploadFailed)?);
    let mut written: u64 = 0;

    pin_mut!(content);
    while let Some(chunk) = content.next().await {
        let chunk = chunk.map_err(Into::<ShareError>::into)?;

        written += chunk.len() as u64;
        if written > max_size {
            debug!("Upload of {} exceeds limit of {} bytes", file_name, max_size);
            return Err(ShareError::FileTooLarge { limit: max_size });
        }

        file.write_all(&chunk)
            .await
            .map_err(ShareError::UploadFailed)?;
    }

    file.flush().await.map_err(ShareError::UploadFailed)?;
    drop(file);

    staged
        .persist(&dest)
        .map_err(|e| ShareError::UploadFailed(e.error))?;

    info!("Saved upload: {} ({} bytes)", dest.display(), written);

    Ok(SavedFile {
        filename: file_name,
        path: dest,
        size: written,
    })
}
