//! Upload batch validation.
//!
//! A batch of files is accepted or rejected as a whole: one offending file
//! rejects every file in the batch. Files are never modified here.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of files in one upload batch.
pub const DEFAULT_MAX_FILES: usize = 10;

/// Maximum size of a single file (5 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_WEBP: &str = "image/webp";

/// MIME types accepted by default.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[MIME_JPEG, MIME_PNG, MIME_WEBP];

// ---------------------------------------------------------------------------
// UploadFile
// ---------------------------------------------------------------------------

/// A file selected for upload, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Size of the file contents in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Canonical file extension for an accepted MIME type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        MIME_JPEG => Some("jpg"),
        MIME_PNG => Some("png"),
        MIME_WEBP => Some("webp"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Limits applied to every upload batch before it reaches the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConstraints {
    pub max_files: usize,
    pub max_file_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadConstraints {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl UploadConstraints {
    pub fn allows_type(&self, content_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == content_type)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reason a whole upload batch was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("No files were selected for upload")]
    EmptyBatch,

    #[error("Too many files: {count} selected, at most {max} allowed per upload")]
    TooManyFiles { count: usize, max: usize },

    #[error("File '{file_name}' is too large ({size} bytes, maximum {max} bytes)")]
    FileTooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },

    #[error("File '{file_name}' has unsupported type '{content_type}'. Allowed types: {}", .allowed.join(", "))]
    UnsupportedType {
        file_name: String,
        content_type: String,
        allowed: Vec<String>,
    },
}

/// Check a batch against `constraints`.
///
/// Returns the batch unchanged when every file passes. The count limit is
/// checked first, then each file in order for size and then type; the first
/// violation rejects the batch.
pub fn validate_batch<'a>(
    files: &'a [UploadFile],
    constraints: &UploadConstraints,
) -> Result<&'a [UploadFile], UploadRejection> {
    if files.is_empty() {
        return Err(UploadRejection::EmptyBatch);
    }

    if files.len() > constraints.max_files {
        return Err(UploadRejection::TooManyFiles {
            count: files.len(),
            max: constraints.max_files,
        });
    }

    for file in files {
        if file.size() > constraints.max_file_bytes {
            return Err(UploadRejection::FileTooLarge {
                file_name: file.file_name.clone(),
                size: file.size(),
                max: constraints.max_file_bytes,
            });
        }
        if !constraints.allows_type(&file.content_type) {
            return Err(UploadRejection::UnsupportedType {
                file_name: file.file_name.clone(),
                content_type: file.content_type.clone(),
                allowed: constraints.allowed_types.clone(),
            });
        }
    }

    Ok(files)
}
