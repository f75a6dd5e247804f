use crate::entities::{CourseMode, StringList, course_entity as courses};
use crate::error::{AppError, AppResult};
use crate::external::{FileStorage, UploadedFile};
use crate::models::{
    Course, CourseListQuery, CourseRequest, PaginatedResponse, PaginationParams,
    SHORT_DESCRIPTION_MAX,
};
use crate::services::listing::{fetch_list, trimmed};
use crate::utils::require;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

const IMAGE_FOLDER: &str = "course";

pub struct CourseService {
    pool: DatabaseConnection,
    storage: Arc<dyn FileStorage>,
}

fn check_short_description(text: &str) -> AppResult<()> {
    if text.chars().count() > SHORT_DESCRIPTION_MAX {
        return Err(AppError::ValidationError(format!(
            "shortDescription must be at most {SHORT_DESCRIPTION_MAX} characters"
        )));
    }
    Ok(())
}

fn check_fees(fees: f64) -> AppResult<f64> {
    if !fees.is_finite() || fees < 0.0 {
        return Err(AppError::ValidationError(
            "fees must be a non-negative number".to_string(),
        ));
    }
    Ok(fees)
}

impl CourseService {
    pub fn new(pool: DatabaseConnection, storage: Arc<dyn FileStorage>) -> Self {
        Self { pool, storage }
    }

    async fn find_live(&self, id: i64) -> AppResult<courses::Model> {
        courses::Entity::find_by_id(id)
            .filter(courses::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
    }

    pub async fn create(
        &self,
        req: CourseRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<Course> {
        let title = require(req.title.as_deref(), "title")?.to_string();
        let short_description = require(req.short_description.as_deref(), "shortDescription")?.to_string();
        check_short_description(&short_description)?;
        let full_description = require(req.full_description.as_deref(), "fullDescription")?.to_string();
        let duration = require(req.duration.as_deref(), "duration")?.to_string();
        let category = require(req.category.as_deref(), "category")?.to_string();
        let fees = check_fees(
            req.fees
                .ok_or_else(|| AppError::ValidationError("fees is required".to_string()))?,
        )?;
        if let Some(file) = &image {
            file.validate_image()?;
        }

        let stored = match &image {
            Some(file) => Some(self.storage.store(IMAGE_FOLDER, file).await?),
            None => None,
        };

        let now = Utc::now();
        let model = courses::ActiveModel {
            title: Set(title),
            short_description: Set(short_description),
            full_description: Set(full_description),
            duration: Set(duration),
            category: Set(category),
            mode: Set(req.mode.unwrap_or(CourseMode::Offline)),
            fees: Set(fees),
            image: Set(stored.as_ref().map(|s| s.url.clone())),
            image_public_id: Set(stored.map(|s| s.asset_id)),
            syllabus: Set(StringList(req.syllabus.unwrap_or_default())),
            prerequisites: Set(StringList(req.prerequisites.unwrap_or_default())),
            tags: Set(StringList(req.tags.unwrap_or_default())),
            visible: Set(req.visible.unwrap_or(true)),
            is_deleted: Set(false),
            created_by: Set(Some(actor)),
            updated_by: Set(Some(actor)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Course {} created", model.id);
        Ok(model)
    }

    pub async fn list(&self, query: &CourseListQuery) -> AppResult<PaginatedResponse<Course>> {
        let mut select = courses::Entity::find().filter(courses::Column::IsDeleted.eq(false));
        if let Some(visible) = query.visible {
            select = select.filter(courses::Column::Visible.eq(visible));
        }
        let params = PaginationParams::new(query.page, query.limit);
        fetch_list(
            &self.pool,
            select.order_by_desc(courses::Column::CreatedAt),
            &params,
            None,
        )
        .await
    }

    pub async fn get(&self, id: i64) -> AppResult<Course> {
        self.find_live(id).await
    }

    pub async fn update(
        &self,
        id: i64,
        req: CourseRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<Course> {
        let course = self.find_live(id).await?;

        if let Some(text) = &req.short_description {
            check_short_description(text.trim())?;
        }
        if let Some(category) = &req.category {
            if category.trim().is_empty() {
                return Err(AppError::ValidationError("category cannot be empty".to_string()));
            }
        }
        let fees = req.fees.map(check_fees).transpose()?;

        let old_asset = course.image_public_id.clone();
        let mut am = course.into_active_model();
        if let Some(v) = trimmed(req.title) {
            am.title = Set(v);
        }
        if let Some(v) = trimmed(req.short_description) {
            am.short_description = Set(v);
        }
        if let Some(v) = trimmed(req.full_description) {
            am.full_description = Set(v);
        }
        if let Some(v) = trimmed(req.duration) {
            am.duration = Set(v);
        }
        if let Some(v) = trimmed(req.category) {
            am.category = Set(v);
        }
        if let Some(v) = req.mode {
            am.mode = Set(v);
        }
        if let Some(v) = fees {
            am.fees = Set(v);
        }
        if let Some(v) = req.syllabus {
            am.syllabus = Set(StringList(v));
        }
        if let Some(v) = req.prerequisites {
            am.prerequisites = Set(StringList(v));
        }
        if let Some(v) = req.tags {
            am.tags = Set(StringList(v));
        }
        if let Some(v) = req.visible {
            am.visible = Set(v);
        }

        let mut replaced = false;
        if let Some(file) = &image {
            file.validate_image()?;
            let stored = self.storage.store(IMAGE_FOLDER, file).await?;
            am.image = Set(Some(stored.url));
            am.image_public_id = Set(Some(stored.asset_id));
            replaced = true;
        }
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        let course = am.update(&self.pool).await?;

        if replaced {
            self.storage.discard(old_asset.as_deref()).await;
        }
        Ok(course)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let course = courses::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
        let asset = course.image_public_id.clone();
        course.delete(&self.pool).await?;
        self.storage.discard(asset.as_deref()).await;
        log::info!("Course {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::external::LocalDiskStorage;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: DatabaseConnection) -> CourseService {
        CourseService::new(db, Arc::new(LocalDiskStorage::new(&StorageConfig::default())))
    }

    fn request() -> CourseRequest {
        CourseRequest {
            title: Some("IELTS Preparation".into()),
            short_description: Some("Eight weeks of band 7 practice".into()),
            full_description: Some("Reading, writing, listening and speaking".into()),
            duration: Some("2 months".into()),
            category: Some("Language".into()),
            fees: Some(15000.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_short_description_limit() {
        assert!(check_short_description(&"a".repeat(300)).is_ok());
        assert!(check_short_description(&"a".repeat(301)).is_err());
    }

    #[tokio::test]
    async fn test_long_short_description_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let mut req = request();
        req.short_description = Some("x".repeat(301));
        assert!(matches!(
            svc.create(req, None, 1).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(svc.pool.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_blank_category_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let mut req = request();
        req.category = Some("   ".into());
        assert!(svc.create(req, None, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_negative_fees_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let mut req = request();
        req.fees = Some(-1.0);
        assert!(svc.create(req, None, 1).await.is_err());
    }
}
