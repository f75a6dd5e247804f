use crate::entities::{
    CollegeStatus, IdList, StringList, college_entity as colleges, country_entity as countries,
    course_entity as courses,
};
use crate::error::{AppError, AppResult};
use crate::external::{FileStorage, UploadedFile};
use crate::models::{
    College, CollegeDetail, CollegeListQuery, CollegeRequest, PaginatedResponse,
};
use crate::services::listing::{contains_pattern, fetch_list, load_by_ids, trimmed};
use crate::utils::require;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

const IMAGE_FOLDER: &str = "college";

pub struct CollegeService {
    pool: DatabaseConnection,
    storage: Arc<dyn FileStorage>,
}

impl CollegeService {
    pub fn new(pool: DatabaseConnection, storage: Arc<dyn FileStorage>) -> Self {
        Self { pool, storage }
    }

    async fn find_live(&self, id: i64) -> AppResult<colleges::Model> {
        colleges::Entity::find_by_id(id)
            .filter(colleges::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("College not found".to_string()))
    }

    /// 编码只在未删除的学校中唯一
    async fn ensure_code_free(&self, code: &str, except: Option<i64>) -> AppResult<()> {
        let mut query = colleges::Entity::find()
            .filter(colleges::Column::Code.eq(code))
            .filter(colleges::Column::IsDeleted.eq(false));
        if let Some(id) = except {
            query = query.filter(colleges::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Duplicate(
                "College with this code already exists".to_string(),
            ));
        }
        Ok(())
    }

    async fn with_references(&self, rows: Vec<College>) -> AppResult<Vec<CollegeDetail>> {
        let country_map = load_by_ids::<countries::Entity, _>(
            &self.pool,
            countries::Column::Id,
            rows.iter().map(|c| c.country_id),
            |c| c.id,
        )
        .await?;
        let course_map = load_by_ids::<courses::Entity, _>(
            &self.pool,
            courses::Column::Id,
            rows.iter().flat_map(|c| c.course_ids.0.iter().copied()),
            |c| c.id,
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|college| CollegeDetail {
                country: country_map
                    .get(&college.country_id)
                    .filter(|c| !c.is_deleted)
                    .cloned(),
                courses: college
                    .course_ids
                    .0
                    .iter()
                    .filter_map(|id| course_map.get(id))
                    .filter(|c| !c.is_deleted)
                    .cloned()
                    .collect(),
                college,
            })
            .collect())
    }

    pub async fn create(
        &self,
        req: CollegeRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<CollegeDetail> {
        let name = require(req.name.as_deref(), "name")?.to_string();
        let code = require(req.code.as_deref(), "code")?.to_string();
        let category = req
            .category
            .ok_or_else(|| AppError::ValidationError("category is required".to_string()))?;
        let country_id = req
            .country
            .ok_or_else(|| AppError::ValidationError("country is required".to_string()))?;
        if let Some(file) = &image {
            file.validate_image()?;
        }

        self.ensure_code_free(&code, None).await?;

        let stored = match &image {
            Some(file) => Some(self.storage.store(IMAGE_FOLDER, file).await?),
            None => None,
        };

        let now = Utc::now();
        let model = colleges::ActiveModel {
            name: Set(name),
            code: Set(code),
            email: Set(trimmed(req.email)),
            phone: Set(trimmed(req.phone)),
            address: Set(trimmed(req.address)),
            website: Set(trimmed(req.website)),
            desc: Set(trimmed(req.desc)),
            map: Set(trimmed(req.map)),
            category: Set(category),
            status: Set(req.status.unwrap_or(CollegeStatus::New)),
            facilities: Set(StringList(req.facilities.unwrap_or_default())),
            services: Set(StringList(req.services.unwrap_or_default())),
            country_id: Set(country_id),
            course_ids: Set(IdList(req.courses.unwrap_or_default())),
            image: Set(stored.as_ref().map(|s| s.url.clone())),
            image_public_id: Set(stored.map(|s| s.asset_id)),
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

        log::info!("College {} ({}) created", model.id, model.code);
        let mut detailed = self.with_references(vec![model]).await?;
        detailed
            .pop()
            .ok_or_else(|| AppError::InternalError("College vanished after insert".to_string()))
    }

    pub async fn list(&self, query: &CollegeListQuery) -> AppResult<PaginatedResponse<CollegeDetail>> {
        let mut select = colleges::Entity::find().filter(colleges::Column::IsDeleted.eq(false));

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(colleges::Column::Name)))
                    .like(contains_pattern(&search.to_lowercase())),
            );
        }
        if let Some(category) = query.category {
            select = select.filter(colleges::Column::Category.eq(category));
        }
        if let Some(status) = query.status {
            select = select.filter(colleges::Column::Status.eq(status));
        }
        if let Some(country_id) = query.country {
            select = select.filter(colleges::Column::CountryId.eq(country_id));
        }

        let page = fetch_list(
            &self.pool,
            select.order_by_desc(colleges::Column::CreatedAt),
            &query.pagination(),
            Some(CollegeListQuery::DEFAULT_LIMIT),
        )
        .await?;

        let items = self.with_references(page.items).await?;
        Ok(PaginatedResponse {
            items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        })
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(colleges::Entity::find()
            .filter(colleges::Column::IsDeleted.eq(false))
            .count(&self.pool)
            .await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<CollegeDetail> {
        let college = self.find_live(id).await?;
        let mut detailed = self.with_references(vec![college]).await?;
        detailed
            .pop()
            .ok_or_else(|| AppError::NotFound("College not found".to_string()))
    }

    pub async fn update(
        &self,
        id: i64,
        req: CollegeRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<CollegeDetail> {
        let college = self.find_live(id).await?;

        let code = trimmed(req.code);
        if let Some(code) = &code {
            self.ensure_code_free(code, Some(id)).await?;
        }

        let old_asset = college.image_public_id.clone();
        let mut am = college.into_active_model();
        if let Some(v) = trimmed(req.name) {
            am.name = Set(v);
        }
        if let Some(v) = code {
            am.code = Set(v);
        }
        if let Some(v) = req.email {
            am.email = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.phone {
            am.phone = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.address {
            am.address = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.website {
            am.website = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.desc {
            am.desc = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.map {
            am.map = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.category {
            am.category = Set(v);
        }
        if let Some(v) = req.status {
            am.status = Set(v);
        }
        if let Some(v) = req.facilities {
            am.facilities = Set(StringList(v));
        }
        if let Some(v) = req.services {
            am.services = Set(StringList(v));
        }
        if let Some(v) = req.country {
            am.country_id = Set(v);
        }
        if let Some(v) = req.courses {
            am.course_ids = Set(IdList(v));
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
        let college = am.update(&self.pool).await?;

        if replaced {
            self.storage.discard(old_asset.as_deref()).await;
        }
        let mut detailed = self.with_references(vec![college]).await?;
        detailed
            .pop()
            .ok_or_else(|| AppError::NotFound("College not found".to_string()))
    }

    pub async fn soft_delete(&self, id: i64, actor: i64) -> AppResult<()> {
        let college = self.find_live(id).await?;
        let mut am = college.into_active_model();
        am.is_deleted = Set(true);
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        log::info!("College {} soft deleted", id);
        Ok(())
    }

    pub async fn hard_delete(&self, id: i64) -> AppResult<()> {
        let college = colleges::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("College not found".to_string()))?;
        let asset = college.image_public_id.clone();
        college.delete(&self.pool).await?;
        self.storage.discard(asset.as_deref()).await;
        log::info!("College {} permanently deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::entities::CollegeCategory;
    use crate::external::LocalDiskStorage;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn college(id: i64, deleted: bool) -> colleges::Model {
        let now = Utc::now();
        colleges::Model {
            id,
            name: "Maple University".into(),
            code: "MAPLE".into(),
            email: None,
            phone: None,
            address: None,
            website: None,
            desc: None,
            map: None,
            category: CollegeCategory::Graduate,
            status: CollegeStatus::New,
            facilities: StringList::default(),
            services: StringList::default(),
            country_id: 1,
            course_ids: IdList::default(),
            image: None,
            image_public_id: None,
            visible: true,
            is_deleted: deleted,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: DatabaseConnection) -> CollegeService {
        CollegeService::new(db, Arc::new(LocalDiskStorage::new(&StorageConfig::default())))
    }

    #[tokio::test]
    async fn test_duplicate_code_among_live_colleges() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![college(1, false)]])
            .into_connection();
        let svc = service(db);
        let req = CollegeRequest {
            name: Some("Maple Two".into()),
            code: Some("MAPLE".into()),
            category: Some(CollegeCategory::Graduate),
            country: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            svc.create(req, None, 1).await,
            Err(AppError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_soft_deleted_college_is_hidden_from_get() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<colleges::Model>::new()])
            .into_connection();
        let svc = service(db);
        assert!(matches!(svc.get(5).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_hard_delete_removes_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![college(2, true)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service(db);
        svc.hard_delete(2).await.unwrap();
        assert_eq!(svc.pool.into_transaction_log().len(), 2);
    }
}
