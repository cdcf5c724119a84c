use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions recognized when the caller does not pass any.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".webp"];

/// List the image files directly inside `folder`, sorted ascending.
///
/// A file matches when its name ends with one of `exts` (case-sensitive).
/// Hidden files and subdirectories are never returned. Entries that are not
/// regular files, such as directories or dangling symlinks named like images,
/// are dropped here and so never show up as load failures. A folder that is
/// missing or unreadable yields an empty list.
pub fn list_image_paths<S: AsRef<str>>(folder: impl AsRef<Path>, exts: &[S]) -> Vec<PathBuf> {
    let folder = folder.as_ref();
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read {}: {e}", folder.display());
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| matches_extension(&entry.file_name(), exts))
        .map(|entry| folder.join(entry.file_name()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    debug!("Found {} image paths in {}", paths.len(), folder.display());
    paths
}

fn matches_extension<S: AsRef<str>>(name: &std::ffi::OsStr, exts: &[S]) -> bool {
    let name = name.as_encoded_bytes();
    if name.first() == Some(&b'.') {
        return false;
    }
    exts.iter().any(|ext| {
        let ext = ext.as_ref().as_bytes();
        !ext.is_empty() && name.ends_with(ext)
    })
}
