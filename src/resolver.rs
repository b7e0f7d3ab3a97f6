//! Mapping of request subpaths onto the shared directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::ShareError;

/// The directory tree exposed by the server.
///
/// Holds the canonical form of the configured folder so that every resolved path can be
/// checked for containment with a plain prefix comparison.
#[derive(Debug, Clone)]
pub struct SharedRoot {
    path: PathBuf,
}

impl SharedRoot {
    /// Validate the configured folder and pin its canonical path.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let canonical = path
            .canonicalize()
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))?;

        if !canonical.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Shared path is not a directory: {}", path.display()),
            ));
        }

        Ok(Self { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a client subpath to an absolute path inside the root.
    ///
    /// Existing targets are canonicalized and must stay below the root, which also
    /// catches symlinks pointing elsewhere. Missing targets come back as the joined path
    /// so the caller can pick the right 404.
    pub fn resolve(&self, subpath: &str) -> Result<PathBuf, ShareError> {
        let joined = join_subpath(&self.path, subpath)?;

        match joined.canonicalize() {
            Ok(canonical) => {
                if !canonical.starts_with(&self.path) {
                    warn!(
                        "Symlink escape attempt: {:?} resolved to {:?} outside {:?}",
                        subpath, canonical, self.path
                    );
                    return Err(ShareError::PathEscape);
                }
                Ok(canonical)
            }
            Err(e) if is_missing(&e) => Ok(joined),
            Err(e) => Err(ShareError::Io(e)),
        }
    }
}

/// A path is missing when it, or one of its parents, does not exist as a directory.
pub(crate) fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Join `subpath` onto `root` component by component without touching the filesystem.
fn join_subpath(root: &Path, subpath: &str) -> Result<PathBuf, ShareError> {
    let subpath = subpath.trim_start_matches('/');

    if subpath.is_empty() || subpath == "." {
        return Ok(root.to_path_buf());
    }

    let mut result = root.to_path_buf();

    for component in Path::new(subpath).components() {
        match component {
            Component::Normal(name) => {
                if name.to_string_lossy().contains('\0') {
                    warn!("Path component contains null byte: {:?}", name);
                    return Err(ShareError::PathEscape);
                }
                result.push(name);
            }
            Component::CurDir => continue,
            Component::ParentDir => {
                warn!("Path traversal attempt: {:?}", subpath);
                return Err(ShareError::PathEscape);
            }
            Component::RootDir | Component::Prefix(_) => {
                warn!("Absolute path component in subpath: {:?}", subpath);
                return Err(ShareError::PathEscape);
            }
        }
    }

    Ok(result)
}
