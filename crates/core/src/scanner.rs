use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

use crate::domain::{ImageFormat, ImageRecord};
use crate::error::{Error, Result};

/// Recursively discover image files under `root`.
///
/// Entries are visited in file-name order so repeated runs over the same tree
/// produce the same sequence. Each record's URL is the path relative to `root`,
/// joined with `/` and prefixed by `/<url_prefix>`.
/// Unreadable entries are logged and skipped. Symlinked files are indexed
/// under their link path; symlinked directories are not descended.
pub fn scan_directory(root: &Path, url_prefix: &str) -> Result<Vec<ImageRecord>> {
    if !root.exists() {
        return Err(Error::ImageRootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::ImageRootNotDirectory(root.to_path_buf()));
    }

    let mut records = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        let is_file = if entry.path_is_symlink() {
            path.is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }

        let format = match path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
        {
            Some(f) => f,
            None => continue,
        };

        let rel = match path.strip_prefix(root) {
            Ok(r) => r,
            Err(_) => continue,
        };

        let filename = entry.file_name().to_string_lossy().to_string();
        let folder = path.parent();
        let folder_name = folder
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let parent_folder_name = folder
            .and_then(|p| p.parent())
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        records.push(ImageRecord {
            url: build_url(url_prefix, rel),
            filename,
            folder_name,
            parent_folder_name,
            format,
        });
    }

    Ok(records)
}

/// Join a relative path into a `/`-separated URL under `/<url_prefix>`.
fn build_url(url_prefix: &str, rel: &Path) -> String {
    let mut url = String::new();
    for segment in url_prefix.split('/').filter(|s| !s.is_empty()) {
        url.push('/');
        url.push_str(segment);
    }
    for component in rel.components() {
        url.push('/');
        url.push_str(&component.as_os_str().to_string_lossy());
    }
    url
}
