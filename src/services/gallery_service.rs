use crate::entities::gallery_entity as galleries;
use crate::error::{AppError, AppResult};
use crate::external::{FileStorage, UploadedFile};
use crate::models::{GalleryItem, GalleryRequest, PaginatedResponse, PaginationParams};
use crate::services::listing::{fetch_list, trimmed};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

const IMAGE_FOLDER: &str = "gallery";

pub struct GalleryService {
    pool: DatabaseConnection,
    storage: Arc<dyn FileStorage>,
}

impl GalleryService {
    pub fn new(pool: DatabaseConnection, storage: Arc<dyn FileStorage>) -> Self {
        Self { pool, storage }
    }

    async fn find_live(&self, id: i64) -> AppResult<galleries::Model> {
        galleries::Entity::find_by_id(id)
            .filter(galleries::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))
    }

    pub async fn create(
        &self,
        req: GalleryRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<GalleryItem> {
        let file = image
            .ok_or_else(|| AppError::ValidationError("image is required".to_string()))?;
        file.validate_image()?;
        let stored = self.storage.store(IMAGE_FOLDER, &file).await?;

        let now = Utc::now();
        let model = galleries::ActiveModel {
            image: Set(stored.url),
            image_public_id: Set(Some(stored.asset_id)),
            date: Set(req.date),
            title: Set(trimmed(req.title)),
            source: Set(trimmed(req.from)),
            link: Set(trimmed(req.link)),
            is_deleted: Set(false),
            created_by: Set(Some(actor)),
            updated_by: Set(Some(actor)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Gallery item {} created", model.id);
        Ok(model)
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<GalleryItem>> {
        let select = galleries::Entity::find()
            .filter(galleries::Column::IsDeleted.eq(false))
            .order_by_desc(galleries::Column::CreatedAt);
        fetch_list(&self.pool, select, params, None).await
    }

    pub async fn get(&self, id: i64) -> AppResult<GalleryItem> {
        self.find_live(id).await
    }

    pub async fn update(
        &self,
        id: i64,
        req: GalleryRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<GalleryItem> {
        let item = self.find_live(id).await?;
        let old_asset = item.image_public_id.clone();

        let mut am = item.into_active_model();
        if let Some(v) = req.date {
            am.date = Set(Some(v));
        }
        if let Some(v) = req.title {
            am.title = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.from {
            am.source = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.link {
            am.link = Set(trimmed(Some(v)));
        }

        let mut replaced = false;
        if let Some(file) = &image {
            file.validate_image()?;
            let stored = self.storage.store(IMAGE_FOLDER, file).await?;
            am.image = Set(stored.url);
            am.image_public_id = Set(Some(stored.asset_id));
            replaced = true;
        }
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        let item = am.update(&self.pool).await?;

        if replaced {
            self.storage.discard(old_asset.as_deref()).await;
        }
        Ok(item)
    }

    pub async fn soft_delete(&self, id: i64, actor: i64) -> AppResult<()> {
        let item = self.find_live(id).await?;
        let mut am = item.into_active_model();
        am.is_deleted = Set(true);
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        log::info!("Gallery item {} soft deleted", id);
        Ok(())
    }

    pub async fn hard_delete(&self, id: i64) -> AppResult<()> {
        let item = galleries::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;
        let asset = item.image_public_id.clone();
        item.delete(&self.pool).await?;
        self.storage.discard(asset.as_deref()).await;
        log::info!("Gallery item {} permanently deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::external::LocalDiskStorage;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_image_is_required() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = GalleryService::new(
            db,
            Arc::new(LocalDiskStorage::new(&StorageConfig::default())),
        );
        let req = GalleryRequest {
            title: Some("Visa day".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.create(req, None, 1).await,
            Err(AppError::ValidationError(m)) if m == "image is required"
        ));
        assert!(svc.pool.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_non_image_upload() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = GalleryService::new(
            db,
            Arc::new(LocalDiskStorage::new(&StorageConfig::default())),
        );
        let file = UploadedFile {
            file_name: "notes.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(svc
            .create(GalleryRequest::default(), Some(file), 1)
            .await
            .is_err());
    }
}
