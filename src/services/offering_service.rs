use crate::entities::{ServicePoints, offering_entity as offerings};
use crate::error::{AppError, AppResult};
use crate::external::{FileStorage, UploadedFile};
use crate::models::{Offering, OfferingRequest, PaginatedResponse, PaginationParams};
use crate::services::listing::{fetch_list, trimmed};
use crate::utils::require;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

const IMAGE_FOLDER: &str = "services";

/// Consultancy services shown on the public site.
pub struct OfferingService {
    pool: DatabaseConnection,
    storage: Arc<dyn FileStorage>,
}

impl OfferingService {
    pub fn new(pool: DatabaseConnection, storage: Arc<dyn FileStorage>) -> Self {
        Self { pool, storage }
    }

    async fn find_live(&self, id: i64) -> AppResult<offerings::Model> {
        offerings::Entity::find_by_id(id)
            .filter(offerings::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
    }

    pub async fn create(
        &self,
        req: OfferingRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<Offering> {
        let title = require(req.title.as_deref(), "title")?.to_string();
        let short_desc = require(req.short_desc.as_deref(), "shortDesc")?.to_string();
        let full_desc = require(req.full_desc.as_deref(), "fullDesc")?.to_string();
        let file = image
            .ok_or_else(|| AppError::ValidationError("image is required".to_string()))?;
        file.validate_image()?;
        let stored = self.storage.store(IMAGE_FOLDER, &file).await?;

        let now = Utc::now();
        let model = offerings::ActiveModel {
            title: Set(title),
            short_desc: Set(short_desc),
            full_desc: Set(full_desc),
            image: Set(stored.url),
            image_public_id: Set(Some(stored.asset_id)),
            points: Set(ServicePoints(req.points.unwrap_or_default())),
            is_deleted: Set(false),
            deleted_at: Set(None),
            created_by: Set(Some(actor)),
            updated_by: Set(Some(actor)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Service {} created", model.id);
        Ok(model)
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<Offering>> {
        let select = offerings::Entity::find()
            .filter(offerings::Column::IsDeleted.eq(false))
            .order_by_desc(offerings::Column::CreatedAt);
        fetch_list(&self.pool, select, params, None).await
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(offerings::Entity::find()
            .filter(offerings::Column::IsDeleted.eq(false))
            .count(&self.pool)
            .await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Offering> {
        self.find_live(id).await
    }

    pub async fn update(
        &self,
        id: i64,
        req: OfferingRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<Offering> {
        let offering = self.find_live(id).await?;
        let old_asset = offering.image_public_id.clone();

        let mut am = offering.into_active_model();
        if let Some(v) = trimmed(req.title) {
            am.title = Set(v);
        }
        if let Some(v) = trimmed(req.short_desc) {
            am.short_desc = Set(v);
        }
        if let Some(v) = trimmed(req.full_desc) {
            am.full_desc = Set(v);
        }
        if let Some(v) = req.points {
            am.points = Set(ServicePoints(v));
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
        let offering = am.update(&self.pool).await?;

        if replaced {
            self.storage.discard(old_asset.as_deref()).await;
        }
        Ok(offering)
    }

    pub async fn soft_delete(&self, id: i64, actor: i64) -> AppResult<()> {
        let offering = self.find_live(id).await?;
        let now = Utc::now();
        let mut am = offering.into_active_model();
        am.is_deleted = Set(true);
        am.deleted_at = Set(Some(now));
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(now);
        am.update(&self.pool).await?;
        log::info!("Service {} soft deleted", id);
        Ok(())
    }

    pub async fn hard_delete(&self, id: i64) -> AppResult<()> {
        let offering = offerings::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;
        let asset = offering.image_public_id.clone();
        offering.delete(&self.pool).await?;
        self.storage.discard(asset.as_deref()).await;
        log::info!("Service {} permanently deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::entities::ServicePoint;
    use crate::external::LocalDiskStorage;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn offering(id: i64) -> offerings::Model {
        let now = Utc::now();
        offerings::Model {
            id,
            title: "Visa Guidance".into(),
            short_desc: "Visa help".into(),
            full_desc: "End to end visa help".into(),
            image: "/public/services/v.png".into(),
            image_public_id: None,
            points: ServicePoints(vec![ServicePoint {
                title: "Document review".into(),
                description: String::new(),
            }]),
            is_deleted: false,
            deleted_at: None,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: DatabaseConnection) -> OfferingService {
        OfferingService::new(db, Arc::new(LocalDiskStorage::new(&StorageConfig::default())))
    }

    #[tokio::test]
    async fn test_image_is_required() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let req = OfferingRequest {
            title: Some("Visa Guidance".into()),
            short_desc: Some("s".into()),
            full_desc: Some("f".into()),
            points: None,
        };
        assert!(matches!(
            svc.create(req, None, 1).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_stamps_deleted_at() {
        let mut deleted = offering(2);
        deleted.is_deleted = true;
        deleted.deleted_at = Some(Utc::now());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![offering(2)]])
            .append_query_results([vec![deleted]])
            .into_connection();
        let svc = service(db);
        svc.soft_delete(2, 1).await.unwrap();

        let log = svc.pool.into_transaction_log();
        let update = format!("{:?}", log[1]);
        assert!(update.contains("deleted_at"));
        assert!(update.contains("Bool(Some(true))"));
    }
}
