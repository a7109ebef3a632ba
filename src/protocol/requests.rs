//! Request payloads
//!
//! Query strings and JSON bodies accepted by the HTTP API.

use serde::Deserialize;

use crate::error::ExplorerError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// `drive` + `path` as sent by browse, download, preview and delete
#[derive(Debug, Default, Deserialize)]
pub struct TargetParams {
    pub drive: Option<String>,
    #[serde(default)]
    pub path: String,
}

impl TargetParams {
    pub fn drive(&self) -> Result<&str, ExplorerError> {
        self.drive
            .as_deref()
            .filter(|drive| !drive.is_empty())
            .ok_or_else(|| ExplorerError::BadRequest("Missing parameters".into()))
    }

    /// For operations that must name something below the root
    pub fn required_path(&self) -> Result<&str, ExplorerError> {
        if self.path.is_empty() {
            return Err(ExplorerError::BadRequest("Missing parameters".into()));
        }
        Ok(&self.path)
    }
}

#[derive(Debug, Deserialize)]
pub struct MkdirRequest {
    pub drive: Option<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub folder_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DriveParams {
    pub drive: Option<String>,
}
