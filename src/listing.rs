//! Directory enumeration.

use std::path::Path;

use serde::Serialize;
use tokio::fs;
use tracing::{debug, error};

use crate::error::ShareError;

/// Immediate children of one directory, split by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    pub files: Vec<String>,
    pub directories: Vec<String>,
}

/// List the immediate children of `path`.
///
/// Entries are classified through their symlink target. Anything that is neither a
/// regular file nor a directory (dangling links, sockets, fifos) is left out.
pub async fn list(path: &Path) -> Result<DirectoryListing, ShareError> {
    let mut listing = DirectoryListing::default();

    let mut entries = fs::read_dir(path).await.map_err(|e| {
        error!("Error listing folder contents: {}", e);
        ShareError::Io(e)
    })?;

    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        error!("Error listing folder contents: {}", e);
        ShareError::Io(e)
    })? {
        let name = entry.file_name().to_string_lossy().to_string();

        let metadata = match fs::metadata(entry.path()).await {
            Ok(m) => m,
            Err(e) => {
                debug!("Skipping {:?}: {}", name, e);
                continue;
            }
        };

        if metadata.is_file() {
            listing.files.push(name);
        } else if metadata.is_dir() {
            listing.directories.push(name);
        }
    }

    Ok(listing)
}
