use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Category switches sent with a scan. The service scans every category
/// when none is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub sensitive: bool,
    pub forbidden: bool,
    pub policy: bool,
}

impl ScanOptions {
    pub fn all() -> Self {
        Self {
            sensitive: true,
            forbidden: true,
            policy: true,
        }
    }

    /// Multipart field names for the enabled categories.
    pub fn form_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::with_capacity(3);
        if self.sensitive {
            fields.push("scan_sensitive");
        }
        if self.forbidden {
            fields.push("scan_forbidden");
        }
        if self.policy {
            fields.push("scan_policy");
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub file: Option<PathBuf>,
    pub options: ScanOptions,
}

impl ScanRequest {
    pub fn new(file: impl Into<PathBuf>, options: ScanOptions) -> Self {
        Self {
            file: Some(file.into()),
            options,
        }
    }
}

/// File contents read from disk, ready to go into the multipart body.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
