use std::path::PathBuf;

use axum::async_trait;
use time::OffsetDateTime;
use tokio::fs;
use tracing::warn;

use crate::utils::app_error::AppError;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Post,
    Profile,
}

impl UploadKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "post" => Some(Self::Post),
            "profile" => Some(Self::Profile),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Profile => "profile",
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            Self::Post => 5 * 1024 * 1024,
            Self::Profile => 2 * 1024 * 1024,
        }
    }
}

pub fn check_upload(kind: UploadKind, content_type: &str, size: usize) -> Result<(), AppError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(AppError::bad_request(
            "Only JPEG, PNG, WebP and GIF images can be uploaded.",
        ));
    }

    if size > kind.max_bytes() {
        return Err(AppError::bad_request(
            "The file is too large (5MB max for posts, 2MB for profile pictures).",
        ));
    }

    Ok(())
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "gif",
    }
}

pub fn generate_file_name(kind: UploadKind, content_type: &str) -> String {
    format!(
        "{}-{}-{:08x}.{}",
        kind.as_str(),
        OffsetDateTime::now_utc().unix_timestamp(),
        rand::random::<u32>(),
        extension_for(content_type)
    )
}

/// Seam to the object-storage collaborator : uploads go through this trait,
/// which returns the public URL of the stored object.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, AppError>;
}

/// Disk-backed storage, served back under `/uploads/`.
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: PathBuf, public_base: String) -> Self {
        Self { root, public_base }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            warn!("Error creating upload directory : {e}");
            AppError::internal_server_error()
        })?;

        let path = self.root.join(file_name);
        fs::write(&path, bytes).await.map_err(|e| {
            warn!("Error writing upload {} : {e}", path.display());
            AppError::internal_server_error()
        })?;

        Ok(format!(
            "{}/uploads/{}",
            self.public_base.trim_end_matches('/'),
            file_name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_image_mime_types() {
        assert!(check_upload(UploadKind::Post, "application/pdf", 100).is_err());
        assert!(check_upload(UploadKind::Post, "text/html", 100).is_err());
        assert!(check_upload(UploadKind::Post, "image/png", 100).is_ok());
    }

    #[test]
    fn size_limit_depends_on_the_upload_kind() {
        let three_mb = 3 * 1024 * 1024;
        assert!(check_upload(UploadKind::Post, "image/jpeg", three_mb).is_ok());
        assert!(check_upload(UploadKind::Profile, "image/jpeg", three_mb).is_err());
        assert!(check_upload(UploadKind::Post, "image/jpeg", 6 * 1024 * 1024).is_err());
    }

    #[test]
    fn file_names_carry_kind_and_extension() {
        let name = generate_file_name(UploadKind::Profile, "image/png");
        assert!(name.starts_with("profile-"));
        assert!(name.ends_with(".png"));
        assert_ne!(
            generate_file_name(UploadKind::Post, "image/jpeg"),
            generate_file_name(UploadKind::Post, "image/jpeg")
        );
    }

    #[test]
    fn upload_kind_parses_known_values_only() {
        assert_eq!(UploadKind::parse("post"), Some(UploadKind::Post));
        assert_eq!(UploadKind::parse("profile"), Some(UploadKind::Profile));
        assert_eq!(UploadKind::parse("banner"), None);
    }
}
