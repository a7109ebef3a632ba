//! Directory listing
//!
//! Enumerates the immediate children of a resolved directory and enriches
//! each one for presentation.

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use std::io;
use std::time::SystemTime;
use tokio::fs;

use crate::config::PreviewExtensions;
use crate::error::ExplorerError;
use crate::storage::filetype::{FileCategory, categorize, human_size};
use crate::storage::results::{Entry, EntryKind};
use crate::storage::validation::{ResolvedPath, join_relative};

/// Lists the contents of a directory, sorted by name.
///
/// Entries that cannot be stat'ed (deleted mid-listing, permission errors,
/// dangling or escaping symlinks) are skipped rather than failing the listing.
pub async fn list_directory(
    dir: &ResolvedPath,
    tables: &PreviewExtensions,
) -> Result<Vec<Entry>, ExplorerError> {
    let metadata = fs::metadata(dir.as_path())
        .await
        .map_err(|e| ExplorerError::from(e).at(dir.relative()))?;

    if !metadata.is_dir() {
        return Err(ExplorerError::NotFound(dir.relative().to_string()));
    }

    let names = read_names(dir).await?;
    let total = names.len();
    let entries = describe_entries(dir, names, tables).await;

    info!(
        "Listed directory '{}' - {} entries ({} skipped)",
        dir.relative(),
        entries.len(),
        total - entries.len()
    );

    Ok(entries)
}

/// Child names in byte-wise lexical order
async fn read_names(dir: &ResolvedPath) -> Result<Vec<String>, ExplorerError> {
    let mut reader = fs::read_dir(dir.as_path())
        .await
        .map_err(|e| ExplorerError::from(e).at(dir.relative()))?;

    let mut names = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| ExplorerError::from(e).at(dir.relative()))?
    {
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            // Clients address entries by UTF-8 strings, so this one is unreachable anyway
            Err(raw) => debug!("Skipping non UTF-8 entry {raw:?} in '{}'", dir.relative()),
        }
    }

    names.sort();
    Ok(names)
}

async fn describe_entries(
    dir: &ResolvedPath,
    names: Vec<String>,
    tables: &PreviewExtensions,
) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        match describe_entry(dir, &name, tables).await {
            Ok(entry) => entries.push(entry),
            Err(e) => debug!("Skipping '{}' in '{}': {e}", name, dir.relative()),
        }
    }
    entries
}

async fn describe_entry(
    dir: &ResolvedPath,
    name: &str,
    tables: &PreviewExtensions,
) -> io::Result<Entry> {
    let path = dir.as_path().join(name);

    // Links are listed under their own name but must land inside the volume
    if fs::symlink_metadata(&path).await?.file_type().is_symlink() {
        let target = fs::canonicalize(&path).await?;
        if !target.starts_with(dir.root()) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "symlink points outside the volume",
            ));
        }
    }

    let metadata = fs::metadata(&path).await?;
    let modified = format_modified(metadata.modified()?);
    let relative = join_relative(dir.relative(), name);

    let entry = if metadata.is_dir() {
        Entry {
            name: name.to_string(),
            kind: EntryKind::Folder,
            size: None,
            size_human: None,
            icon: FileCategory::Folder,
            can_preview: None,
            path: relative,
            modified,
        }
    } else {
        let size = metadata.len();
        let icon = categorize(name, tables);
        Entry {
            name: name.to_string(),
            kind: EntryKind::File,
            size: Some(size),
            size_human: Some(human_size(size)),
            icon,
            can_preview: Some(icon.is_previewable()),
            path: relative,
            modified,
        }
    };

    Ok(entry)
}

fn format_modified(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::validation::resolve;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn volume() -> (TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("photos")).unwrap();
        std::fs::write(root.join("b.txt"), vec![b'x'; 1536]).unwrap();
        std::fs::write(root.join("a.zip"), b"PK").unwrap();
        std::fs::write(root.join("photos/cat.JPG"), b"jpg").unwrap();
        (tmp, root)
    }

    #[tokio::test]
    async fn test_lists_immediate_children_sorted() {
        let (_tmp, root) = volume();
        let dir = resolve(&root, "").unwrap();
        let entries = list_directory(&dir, &PreviewExtensions::default())
            .await
            .unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.zip", "b.txt", "photos"]);
    }

    #[tokio::test]
    async fn test_entries_are_enriched() {
        let (_tmp, root) = volume();
        let dir = resolve(&root, "").unwrap();
        let entries = list_directory(&dir, &PreviewExtensions::default())
            .await
            .unwrap();

        let text = &entries[1];
        assert_eq!(text.kind, EntryKind::File);
        assert_eq!(text.size, Some(1536));
        assert_eq!(text.size_human.as_deref(), Some("1.50 KB"));
        assert_eq!(text.icon, FileCategory::Text);
        assert_eq!(text.can_preview, Some(true));
        assert_eq!(text.path, "b.txt");
        assert!(text.modified.ends_with('Z'));

        let archive = &entries[0];
        assert_eq!(archive.icon, FileCategory::Archive);
        assert_eq!(archive.can_preview, Some(false));

        let folder = &entries[2];
        assert_eq!(folder.kind, EntryKind::Folder);
        assert_eq!(folder.size, None);
        assert_eq!(folder.icon, FileCategory::Folder);
    }

    #[tokio::test]
    async fn test_entry_paths_resolve_back_to_their_objects() {
        let (_tmp, root) = volume();
        let dir = resolve(&root, "photos").unwrap();
        let entries = list_directory(&dir, &PreviewExtensions::default())
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "photos/cat.JPG");
        assert_eq!(entries[0].icon, FileCategory::Image);
        let again = resolve(&root, &entries[0].path).unwrap();
        assert_eq!(again.as_path(), root.join("photos/cat.JPG"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_found() {
        let (_tmp, root) = volume();
        let dir = resolve(&root, "nope").unwrap();
        let err = list_directory(&dir, &PreviewExtensions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }

    #[tokio::test]
    async fn test_listing_a_file_is_not_found() {
        let (_tmp, root) = volume();
        let dir = resolve(&root, "b.txt").unwrap();
        let err = list_directory(&dir, &PreviewExtensions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }

    #[tokio::test]
    async fn test_entry_vanishing_before_stat_is_skipped() {
        let (_tmp, root) = volume();
        let dir = resolve(&root, "").unwrap();
        let mut names = read_names(&dir).await.unwrap();

        // Simulate a concurrent delete between enumeration and stat
        std::fs::remove_file(root.join("a.zip")).unwrap();
        names.push("ghost.txt".to_string());

        let entries = describe_entries(&dir, names, &PreviewExtensions::default()).await;
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "photos"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_and_escaping_symlinks_are_skipped() {
        use std::os::unix::fs::symlink;

        let (_tmp, root) = volume();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret"), b"s").unwrap();

        symlink(root.join("gone"), root.join("dangling")).unwrap();
        symlink(outside.path().join("secret"), root.join("escape")).unwrap();
        symlink(root.join("photos"), root.join("pics")).unwrap();

        let dir = resolve(&root, "").unwrap();
        let entries = list_directory(&dir, &PreviewExtensions::default())
            .await
            .unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.zip", "b.txt", "photos", "pics"]);
        assert_eq!(entries[3].kind, EntryKind::Folder);
    }
}
