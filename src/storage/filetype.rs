//! File type classification
//!
//! Extension tables deciding the icon category of an entry and whether a
//! browser may render it inline.

use serde::Serialize;
use std::path::Path;

use crate::config::PreviewExtensions;

const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "tar", "gz", "rar", "7z"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac"];

const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Icon category of a listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Pdf,
    Text,
    Archive,
    Audio,
    Folder,
    Generic,
}

impl FileCategory {
    /// Archives and audio are never rendered inline.
    pub fn is_previewable(self) -> bool {
        matches!(
            self,
            FileCategory::Image | FileCategory::Video | FileCategory::Pdf | FileCategory::Text
        )
    }
}

/// Lowercased extension without the dot. Dotfiles like `.bashrc` have none.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Classifies a file name. Tables are checked in a fixed order, so an
/// extension listed twice (`ogg`) takes the first match.
pub fn categorize(name: &str, tables: &PreviewExtensions) -> FileCategory {
    let Some(ext) = extension_of(name) else {
        return FileCategory::Generic;
    };
    let ext = ext.as_str();
    let listed = |table: &[String]| table.iter().any(|entry| entry == ext);

    if listed(&tables.images) {
        FileCategory::Image
    } else if listed(&tables.videos) {
        FileCategory::Video
    } else if listed(&tables.pdf) {
        FileCategory::Pdf
    } else if listed(&tables.text) {
        FileCategory::Text
    } else if ARCHIVE_EXTENSIONS.contains(&ext) {
        FileCategory::Archive
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        FileCategory::Audio
    } else {
        FileCategory::Generic
    }
}

/// Whether `name` may be streamed inline for in-browser rendering
pub fn can_preview(name: &str, tables: &PreviewExtensions) -> bool {
    categorize(name, tables).is_previewable()
}

/// Renders a byte count with base-1024 units and two decimals.
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}
