//! Reading selected files and folders into memory.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::BatchError;
use crate::Result;

/// A file's content as selected by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name without directories.
    pub name: String,
    /// Path as shown to the user: relative to the selected folder's parent
    /// for folder selections, as given otherwise.
    pub path: String,
    pub content: String,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
        }
    }
}

fn read_error(path: &Path) -> impl FnOnce(std::io::Error) -> crate::Error + '_ {
    move |source| {
        BatchError::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()
    }
}

async fn read_file(path: &Path, display: String) -> Result<SelectedFile> {
    let bytes = tokio::fs::read(path).await.map_err(read_error(path))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| display.clone());
    Ok(SelectedFile {
        name,
        path: display,
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Every regular file under `dir`, sorted by path.
async fn walk(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(read_error(&current))?;
        while let Some(entry) = entries.next_entry().await.map_err(read_error(&current))? {
            let file_type = entry.file_type().await.map_err(read_error(&current))?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Read every file named by `paths`, descending into directories.
///
/// Content that is not valid UTF-8 is decoded lossily.
pub async fn read_selection<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SelectedFile>> {
    let mut selected = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await.map_err(read_error(path))?;
        if meta.is_dir() {
            let base = path.parent().unwrap_or(Path::new(""));
            for file in walk(path).await? {
                let display = file
                    .strip_prefix(base)
                    .unwrap_or(&file)
                    .to_string_lossy()
                    .into_owned();
                selected.push(read_file(&file, display).await?);
            }
        } else {
            selected.push(read_file(path, path.to_string_lossy().into_owned()).await?);
        }
    }
    debug!(files = selected.len(), "Read batch selection");
    Ok(selected)
}
