//! Per-request scratch directories.
//!
//! A [`Workspace`] is an exclusively owned directory created under a shared
//! root. It is removed when released or dropped, whichever comes first, so
//! every exit path of a request handler (early `?` returns and panics
//! included) leaves nothing behind.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "mediacut-";

/// An isolated scratch directory owned by a single request.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Creates a fresh, empty directory under `root`.
    ///
    /// `root` is created if it does not exist yet.
    pub async fn acquire(root: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;
        let root = root.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(WORKSPACE_PREFIX)
                .tempdir_in(root)
        })
        .await
        .map_err(io::Error::other)??;
        let path = dir.path().to_path_buf();
        debug!("Acquired workspace {:?}", path);
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `name` inside the workspace.
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Writes `data` to `name` inside the workspace and returns its path.
    pub async fn write_file(&self, name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.join(name);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    /// Removes the directory and everything in it.
    ///
    /// A directory that is already partly or entirely gone is not an error.
    pub fn release(mut self) -> io::Result<()> {
        self.remove()
    }

    fn remove(&mut self) -> io::Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        match dir.close() {
            Ok(()) => {
                debug!("Released workspace {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            warn!("Failed to remove workspace {:?}: {}", self.path, e);
        }
    }
}
