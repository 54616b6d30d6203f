//! Filesystem source (file shares, local drops) and destination.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use walkdir::WalkDir;

use super::{ByteStream, DestinationProvider, RemoteItem, SourceProvider};
use crate::error::TransferError;

/// Reads an artifact from a directory on a share or the local disk
///
/// Item paths are relative to the root's parent, so a root of
/// `\\share\drops\1234\logs` yields items like `logs/build.txt`.
#[derive(Debug, Clone)]
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this source reads from
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn join_item_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn location_of(item: &RemoteItem) -> Result<PathBuf, TransferError> {
    item.location
        .as_ref()
        .map(PathBuf::from)
        .ok_or_else(|| TransferError::Listing {
            location: item.path.clone(),
            reason: "item has no filesystem location".to_string(),
        })
}

#[async_trait]
impl SourceProvider for FilesystemSource {
    async fn root_items(&self) -> Result<Vec<RemoteItem>, TransferError> {
        let metadata = match tokio::fs::metadata(&self.root).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransferError::SourceMissing(self.root.clone()));
            }
            Err(e) => return Err(TransferError::io(&self.root, e)),
        };

        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let location = Some(self.root.to_string_lossy().into_owned());

        let item = if metadata.is_dir() {
            RemoteItem::folder(name, location)
        } else {
            RemoteItem::file(name, location, Some(metadata.len()))
        };
        Ok(vec![item])
    }

    async fn list(&self, folder: &RemoteItem) -> Result<Vec<RemoteItem>, TransferError> {
        let dir = location_of(folder)?;
        let parent = folder.path.clone();

        // walkdir is blocking; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            let mut items = Vec::new();
            for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
                let entry = entry.map_err(|e| TransferError::Listing {
                    location: dir.display().to_string(),
                    reason: e.to_string(),
                })?;
                let name = entry.file_name().to_string_lossy().into_owned();
                let path = join_item_path(&parent, &name);
                let location = Some(entry.path().to_string_lossy().into_owned());

                if entry.file_type().is_dir() {
                    items.push(RemoteItem::folder(path, location));
                } else {
                    let size = entry.metadata().ok().map(|m| m.len());
                    items.push(RemoteItem::file(path, location, size));
                }
            }
            Ok::<_, TransferError>(items)
        })
        .await
        .map_err(|e| TransferError::Aborted(e.to_string()))?
    }

    async fn open(&self, item: &RemoteItem) -> Result<ByteStream, TransferError> {
        let path = location_of(item)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| TransferError::io(&path, e))?;
        Ok(ReaderStream::new(file)
            .map_err(move |e| TransferError::io(&path, e))
            .boxed())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Writes items under a local root directory
///
/// Each file is streamed to `<name>.partial` and renamed into place once
/// complete; the partial file is removed if anything fails.
#[derive(Debug, Clone)]
pub struct FilesystemDestination {
    root: PathBuf,
}

impl FilesystemDestination {
    /// Create a destination rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve an item path under the root, rejecting anything that escapes it
    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf, TransferError> {
        let mut target = self.root.clone();
        let mut depth = 0usize;
        for segment in relative_path.split(['/', '\\']).filter(|s| !s.is_empty()) {
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => {
                    target.push(part);
                    depth += 1;
                }
                (Some(Component::CurDir), None) => {}
                _ => return Err(TransferError::UnsafePath(relative_path.to_string())),
            }
        }
        if depth == 0 {
            return Err(TransferError::UnsafePath(relative_path.to_string()));
        }
        Ok(target)
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    target.with_file_name(name)
}

async fn write_stream(path: &Path, mut content: ByteStream) -> Result<u64, TransferError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| TransferError::io(path, e))?;
    let mut written = 0u64;
    while let Some(chunk) = content.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| TransferError::io(path, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| TransferError::io(path, e))?;
    Ok(written)
}

#[async_trait]
impl DestinationProvider for FilesystemDestination {
    async fn write(&self, relative_path: &str, content: ByteStream) -> Result<u64, TransferError> {
        let target = self.resolve(relative_path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TransferError::io(parent, e))?;
        }

        let partial = partial_path(&target);
        let result = match write_stream(&partial, content).await {
            Ok(written) => tokio::fs::rename(&partial, &target)
                .await
                .map(|()| written)
                .map_err(|e| TransferError::io(&target, e)),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&partial).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %partial.display(),
                        error = %e,
                        "failed to remove partial file"
                    );
                }
            }
        }
        result
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
