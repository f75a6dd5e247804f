//! Image storage behind one interface; the backend is picked from config.

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_USER_IMAGE: &str = "/public/default/user.png";
pub const DEFAULT_CANDIDATE_IMAGE: &str = "/public/default/candidate.png";

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// 上传的原始文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn validate_image(&self) -> AppResult<()> {
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(AppError::ValidationError(
                "Only image files (jpg, jpeg, png, gif) are allowed!".to_string(),
            ));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::ValidationError(
                "Image must be 5MB or smaller".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
    pub url: String,
    /// 删除时使用的标识
    pub asset_id: String,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, folder: &str, file: &UploadedFile) -> AppResult<StoredAsset>;

    async fn remove(&self, asset_id: &str) -> AppResult<()>;

    /// Best-effort removal used when an image is replaced or its record deleted.
    async fn discard(&self, asset_id: Option<&str>) {
        let Some(asset_id) = asset_id else {
            return;
        };
        if let Err(e) = self.remove(asset_id).await {
            log::warn!("Failed to remove stored asset {}: {}", asset_id, e);
        }
    }
}

/// Writes under `root/<folder>/` and serves the files from `base_url`.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalDiskStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.local_root),
            base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, asset_id: &str) -> AppResult<PathBuf> {
        let relative = Path::new(asset_id);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::ValidationError(format!(
                "Invalid asset id: {asset_id}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

fn sanitize_folder(folder: &str) -> String {
    let cleaned: String = folder
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "uploads".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl FileStorage for LocalDiskStorage {
    async fn store(&self, folder: &str, file: &UploadedFile) -> AppResult<StoredAsset> {
        let folder = sanitize_folder(folder);
        let name = format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            sanitize_file_name(&file.file_name)
        );
        let dir = self.root.join(&folder);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &file.bytes).await?;

        let asset_id = format!("{folder}/{name}");
        log::info!("Stored upload {} ({} bytes)", asset_id, file.bytes.len());
        Ok(StoredAsset {
            url: format!("{}/{}", self.base_url, asset_id),
            asset_id,
        })
    }

    async fn remove(&self, asset_id: &str) -> AppResult<()> {
        // 默认图片不删除
        if asset_id.starts_with("default/") {
            return Ok(());
        }
        let path = self.resolve(asset_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> LocalDiskStorage {
        let root = std::env::temp_dir().join(format!("edu-storage-{}", Uuid::new_v4().simple()));
        LocalDiskStorage::new(&StorageConfig {
            local_root: root.to_string_lossy().into_owned(),
            public_base_url: "/public/".to_string(),
            ..StorageConfig::default()
        })
    }

    fn png(bytes: usize) -> UploadedFile {
        UploadedFile {
            file_name: "../campus photo.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0u8; bytes],
        }
    }

    #[test]
    fn test_validate_image() {
        assert!(png(10).validate_image().is_ok());
        assert!(png(MAX_IMAGE_BYTES + 1).validate_image().is_err());
        let pdf = UploadedFile {
            content_type: "application/pdf".to_string(),
            ..png(10)
        };
        assert!(pdf.validate_image().is_err());
    }

    #[test]
    fn test_sanitize_names() {
        assert_eq!(sanitize_file_name("../campus photo.png"), "campus_photo.png");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_folder("../blogs"), "blogs");
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let storage = storage();
        let asset = storage.store("gallery", &png(4)).await.unwrap();
        assert!(asset.asset_id.starts_with("gallery/"));
        assert!(asset.url.starts_with("/public/gallery/"));
        assert!(asset.url.ends_with("_campus_photo.png"));

        let path = storage.root().join(&asset.asset_id);
        assert!(tokio::fs::metadata(&path).await.is_ok());

        storage.remove(&asset.asset_id).await.unwrap();
        assert!(tokio::fs::metadata(&path).await.is_err());
        // 重复删除不报错
        storage.remove(&asset.asset_id).await.unwrap();

        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[tokio::test]
    async fn test_remove_rejects_traversal() {
        let storage = storage();
        assert!(storage.remove("../etc/passwd").await.is_err());
        assert!(storage.remove("default/user.png").await.is_ok());
    }
}
