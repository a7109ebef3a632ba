//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use tokio::fs::File;

use crate::storage::filetype::FileCategory;

/// Kind of a listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One child of a listed directory. Recomputed on every listing.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
    pub icon: FileCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_preview: Option<bool>,
    /// Path relative to the volume root, usable in follow-up requests
    pub path: String,
    /// ISO-8601 modification time
    pub modified: String,
}

/// Result of a file upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_name: String,
    pub byte_count: u64,
}

/// How a client should treat a streamed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

/// An opened file ready to be streamed to a client
#[derive(Debug)]
pub struct FileStream {
    pub file: File,
    pub file_name: String,
    pub size: u64,
    pub content_type: String,
    pub disposition: Disposition,
}

/// Result of a delete operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteResult {
    File,
    Directory,
    Link,
}
