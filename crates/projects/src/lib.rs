//! `atelier-projects` — project domain: projects, membership rows, comments
//! and their attached documents, with the pure invariants each one carries.

pub mod comment;
pub mod document;
pub mod membership;
pub mod project;

pub use comment::{Comment, validate_comment_payload};
pub use document::{
    Document, FileSizeError, FileUpload, MAX_FILE_SIZE, MIN_FILE_SIZE, validate_file_size,
    validate_files,
};
pub use membership::ProjectRole;
pub use project::{Project, ProjectUpdate};
