use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::{CommentId, DocumentId, UserId};

/// Inclusive lower bound on document size: 1 KiB.
pub const MIN_FILE_SIZE: u64 = 1024;
/// Inclusive upper bound on document size: 5 MiB.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// A document attached to a comment.
///
/// Only metadata and a generated storage key are held here; the storage
/// backend itself is external.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub comment_id: CommentId,
    pub uploaded_by: UserId,
    pub file_name: String,
    pub size_bytes: u64,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(comment_id: CommentId, uploaded_by: UserId, file: &FileUpload) -> Self {
        Self {
            id: DocumentId::new(),
            comment_id,
            uploaded_by,
            file_name: file.name.clone(),
            size_bytes: file.size_bytes,
            storage_key: format!("documents/{}-{}", Uuid::new_v4(), file.name),
            created_at: Utc::now(),
        }
    }
}

/// An incoming file: original name plus its declared size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub name: String,
    pub size_bytes: u64,
}

/// A per-file size violation, keyed by the original filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSizeError {
    pub file_name: String,
    pub message: String,
}

/// Check one file against the [`MIN_FILE_SIZE`], [`MAX_FILE_SIZE`] window.
pub fn validate_file_size(size_bytes: u64) -> Result<(), String> {
    if size_bytes < MIN_FILE_SIZE {
        return Err("File size must be at least 1KB.".to_string());
    }
    if size_bytes > MAX_FILE_SIZE {
        return Err("File size cannot exceed 5MB.".to_string());
    }
    Ok(())
}

/// Validate a whole batch before anything is persisted.
///
/// Every violation is collected; a valid file never suppresses another
/// file's error. On `Err`, the caller must persist nothing.
pub fn validate_files(files: &[FileUpload]) -> Result<(), Vec<FileSizeError>> {
    let errors: Vec<FileSizeError> = files
        .iter()
        .filter_map(|f| {
            validate_file_size(f.size_bytes)
                .err()
                .map(|message| FileSizeError {
                    file_name: f.name.clone(),
                    message,
                })
        })
        .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
