use crate::entities::blog_entity as blogs;
use crate::error::{AppError, AppResult};
use crate::external::{FileStorage, UploadedFile};
use crate::models::{Blog, BlogRequest, PaginatedResponse, PaginationParams};
use crate::services::listing::{fetch_list, trimmed};
use crate::utils::require;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

const IMAGE_FOLDER: &str = "blog";

pub struct BlogService {
    pool: DatabaseConnection,
    storage: Arc<dyn FileStorage>,
}

impl BlogService {
    pub fn new(pool: DatabaseConnection, storage: Arc<dyn FileStorage>) -> Self {
        Self { pool, storage }
    }

    async fn find_live(&self, id: i64) -> AppResult<blogs::Model> {
        blogs::Entity::find_by_id(id)
            .filter(blogs::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))
    }

    async fn ensure_link_free(&self, link: &str, except: Option<i64>) -> AppResult<()> {
        let mut query = blogs::Entity::find().filter(blogs::Column::Link.eq(link));
        if let Some(id) = except {
            query = query.filter(blogs::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Duplicate(
                "Blog with this link already exists".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        req: BlogRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<Blog> {
        let title = require(req.title.as_deref(), "title")?.to_string();
        let short_desc = require(req.short_desc.as_deref(), "shortDesc")?.to_string();
        let full_desc = require(req.full_desc.as_deref(), "fullDesc")?.to_string();
        let link = require(req.link.as_deref(), "link")?.to_string();
        if let Some(file) = &image {
            file.validate_image()?;
        }

        self.ensure_link_free(&link, None).await?;

        let stored = match &image {
            Some(file) => Some(self.storage.store(IMAGE_FOLDER, file).await?),
            None => None,
        };

        let now = Utc::now();
        let model = blogs::ActiveModel {
            title: Set(title),
            short_desc: Set(short_desc),
            full_desc: Set(full_desc),
            image: Set(stored.as_ref().map(|s| s.url.clone())),
            image_public_id: Set(stored.map(|s| s.asset_id)),
            link: Set(link),
            is_visible: Set(req.is_visible.unwrap_or(true)),
            is_deleted: Set(false),
            created_by: Set(Some(actor)),
            updated_by: Set(Some(actor)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Blog {} created", model.id);
        Ok(model)
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<Blog>> {
        let select = blogs::Entity::find()
            .filter(blogs::Column::IsDeleted.eq(false))
            .order_by_desc(blogs::Column::CreatedAt);
        fetch_list(&self.pool, select, params, None).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Blog> {
        self.find_live(id).await
    }

    pub async fn update(
        &self,
        id: i64,
        req: BlogRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<Blog> {
        let blog = self.find_live(id).await?;

        let link = trimmed(req.link);
        if let Some(link) = &link {
            self.ensure_link_free(link, Some(id)).await?;
        }

        let old_asset = blog.image_public_id.clone();
        let mut am = blog.into_active_model();
        if let Some(v) = trimmed(req.title) {
            am.title = Set(v);
        }
        if let Some(v) = trimmed(req.short_desc) {
            am.short_desc = Set(v);
        }
        if let Some(v) = trimmed(req.full_desc) {
            am.full_desc = Set(v);
        }
        if let Some(v) = link {
            am.link = Set(v);
        }
        if let Some(v) = req.is_visible {
            am.is_visible = Set(v);
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
        let blog = am.update(&self.pool).await?;

        if replaced {
            self.storage.discard(old_asset.as_deref()).await;
        }
        Ok(blog)
    }

    /// 软删除时同时移除配图
    pub async fn soft_delete(&self, id: i64, actor: i64) -> AppResult<()> {
        let blog = self.find_live(id).await?;
        let asset = blog.image_public_id.clone();

        let mut am = blog.into_active_model();
        am.is_deleted = Set(true);
        am.image = Set(None);
        am.image_public_id = Set(None);
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;

        self.storage.discard(asset.as_deref()).await;
        log::info!("Blog {} soft deleted", id);
        Ok(())
    }

    pub async fn hard_delete(&self, id: i64) -> AppResult<()> {
        let blog = blogs::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;
        let asset = blog.image_public_id.clone();
        blog.delete(&self.pool).await?;
        self.storage.discard(asset.as_deref()).await;
        log::info!("Blog {} permanently deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::external::LocalDiskStorage;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn blog(id: i64) -> blogs::Model {
        let now = Utc::now();
        blogs::Model {
            id,
            title: "Study in Canada".into(),
            short_desc: "Why Canada".into(),
            full_desc: "Long form".into(),
            image: Some("/public/blog/a.png".into()),
            image_public_id: Some("blog/a.png".into()),
            link: "study-in-canada".into(),
            is_visible: true,
            is_deleted: false,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: DatabaseConnection) -> BlogService {
        BlogService::new(db, Arc::new(LocalDiskStorage::new(&StorageConfig::default())))
    }

    #[tokio::test]
    async fn test_duplicate_link_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![blog(1)]])
            .into_connection();
        let svc = service(db);
        let req = BlogRequest {
            title: Some("Another".into()),
            short_desc: Some("s".into()),
            full_desc: Some("f".into()),
            link: Some("study-in-canada".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.create(req, None, 1).await,
            Err(AppError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_deleted_blog_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<blogs::Model>::new()])
            .into_connection();
        let svc = service(db);
        assert!(matches!(svc.get(1).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_clears_image() {
        let mut deleted = blog(1);
        deleted.is_deleted = true;
        deleted.image = None;
        deleted.image_public_id = None;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![blog(1)]])
            .append_query_results([vec![deleted]])
            .into_connection();
        let svc = service(db);
        svc.soft_delete(1, 1).await.unwrap();

        let log = svc.pool.into_transaction_log();
        assert_eq!(log.len(), 2);
        let update = format!("{:?}", log[1]);
        // image 与 image_public_id 被置空
        assert_eq!(update.matches("String(None)").count(), 2);
    }
}
