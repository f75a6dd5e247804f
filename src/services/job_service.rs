use crate::entities::{
    StringList, certificate_entity as certificates, country_entity as countries, job_entity as jobs,
};
use crate::error::{AppError, AppResult};
use crate::models::{Job, JobDetail, JobRequest, PaginatedResponse, PaginationParams};
use crate::services::listing::{fetch_list, load_by_ids, trimmed};
use crate::utils::require;
use crate::utils::sequence::{format_job_id, job_sequence_key, next_sequence_value};
use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

pub struct JobService {
    pool: DatabaseConnection,
}

fn check_salary(salary: f64) -> AppResult<f64> {
    if !salary.is_finite() || salary < 0.0 {
        return Err(AppError::ValidationError(
            "salary cannot be negative".to_string(),
        ));
    }
    Ok(salary)
}

impl JobService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 读取不过滤已下线的岗位
    async fn find(&self, id: i64) -> AppResult<jobs::Model> {
        jobs::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    /// (title, certificate) 在在招岗位中唯一
    async fn ensure_unique(&self, title: &str, certificate_id: i64, except: Option<i64>) -> AppResult<()> {
        let mut query = jobs::Entity::find()
            .filter(jobs::Column::Title.eq(title))
            .filter(jobs::Column::CertificateId.eq(certificate_id))
            .filter(jobs::Column::IsActive.eq(true));
        if let Some(id) = except {
            query = query.filter(jobs::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Duplicate(
                "An active job with this title and certificate already exists".to_string(),
            ));
        }
        Ok(())
    }

    async fn with_references(&self, rows: Vec<Job>) -> AppResult<Vec<JobDetail>> {
        let country_map = load_by_ids::<countries::Entity, _>(
            &self.pool,
            countries::Column::Id,
            rows.iter().map(|j| j.country_id),
            |c| c.id,
        )
        .await?;
        let certificate_map = load_by_ids::<certificates::Entity, _>(
            &self.pool,
            certificates::Column::Id,
            rows.iter().map(|j| j.certificate_id),
            |c| c.id,
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|job| JobDetail {
                country: country_map.get(&job.country_id).cloned(),
                certificate: certificate_map.get(&job.certificate_id).cloned(),
                job,
            })
            .collect())
    }

    async fn detail(&self, job: Job) -> AppResult<JobDetail> {
        let mut rows = self.with_references(vec![job]).await?;
        rows.pop()
            .ok_or_else(|| AppError::InternalError("Job lookup returned nothing".to_string()))
    }

    pub async fn create(&self, req: JobRequest, actor: i64) -> AppResult<JobDetail> {
        let title = require(req.title.as_deref(), "title")?.to_string();
        let description = require(req.description.as_deref(), "description")?.to_string();
        let company = require(req.company.as_deref(), "company")?.to_string();
        let location = require(req.location.as_deref(), "location")?.to_string();
        let country_id = req
            .country
            .ok_or_else(|| AppError::ValidationError("country is required".to_string()))?;
        let certificate_id = req
            .certificate
            .ok_or_else(|| AppError::ValidationError("certificate is required".to_string()))?;
        let job_type = req
            .job_type
            .ok_or_else(|| AppError::ValidationError("jobType is required".to_string()))?;
        let salary = req.salary.map(check_salary).transpose()?;

        self.ensure_unique(&title, certificate_id, None).await?;

        let now = Utc::now();
        let seq = next_sequence_value(&self.pool, &job_sequence_key(now.year())).await?;
        let job_id = format_job_id(now.year(), seq);

        let model = jobs::ActiveModel {
            job_id: Set(job_id),
            title: Set(title),
            description: Set(description),
            company: Set(company),
            location: Set(location),
            country_id: Set(country_id),
            certificate_id: Set(certificate_id),
            salary: Set(salary),
            job_type: Set(job_type),
            experience: Set(trimmed(req.experience)),
            skills: Set(StringList(req.skills.unwrap_or_default())),
            posted_by: Set(Some(actor)),
            is_active: Set(req.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Job {} posted by user {}", model.job_id, actor);
        self.detail(model).await
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<JobDetail>> {
        let select = jobs::Entity::find()
            .filter(jobs::Column::IsActive.eq(true))
            .order_by_desc(jobs::Column::CreatedAt);
        let page = fetch_list(&self.pool, select, params, None).await?;

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
        Ok(jobs::Entity::find()
            .filter(jobs::Column::IsActive.eq(true))
            .count(&self.pool)
            .await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<JobDetail> {
        let job = self.find(id).await?;
        self.detail(job).await
    }

    pub async fn update(&self, id: i64, req: JobRequest) -> AppResult<JobDetail> {
        let job = self.find(id).await?;

        let title = trimmed(req.title);
        let will_be_active = req.is_active.unwrap_or(job.is_active);
        let reactivating = will_be_active && !job.is_active;
        if will_be_active && (title.is_some() || req.certificate.is_some() || reactivating) {
            let effective_title = title.as_deref().unwrap_or(&job.title);
            let effective_certificate = req.certificate.unwrap_or(job.certificate_id);
            self.ensure_unique(effective_title, effective_certificate, Some(id))
                .await?;
        }
        let salary = req.salary.map(check_salary).transpose()?;

        let mut am = job.into_active_model();
        if let Some(v) = title {
            am.title = Set(v);
        }
        if let Some(v) = trimmed(req.description) {
            am.description = Set(v);
        }
        if let Some(v) = trimmed(req.company) {
            am.company = Set(v);
        }
        if let Some(v) = trimmed(req.location) {
            am.location = Set(v);
        }
        if let Some(v) = req.country {
            am.country_id = Set(v);
        }
        if let Some(v) = req.certificate {
            am.certificate_id = Set(v);
        }
        if let Some(v) = salary {
            am.salary = Set(Some(v));
        }
        if let Some(v) = req.job_type {
            am.job_type = Set(v);
        }
        if let Some(v) = req.experience {
            am.experience = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.skills {
            am.skills = Set(StringList(v));
        }
        if let Some(v) = req.is_active {
            am.is_active = Set(v);
        }
        am.updated_at = Set(Utc::now());
        let job = am.update(&self.pool).await?;

        self.detail(job).await
    }

    /// 岗位下线：isActive=false
    pub async fn deactivate(&self, id: i64) -> AppResult<()> {
        let job = self.find(id).await?;
        let mut am = job.into_active_model();
        am.is_active = Set(false);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        log::info!("Job {} deactivated", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::JobType;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn job(id: i64, active: bool) -> jobs::Model {
        let now = Utc::now();
        jobs::Model {
            id,
            job_id: "JOB/2026/004".into(),
            title: "Staff Nurse".into(),
            description: "Ward duties".into(),
            company: "NHS Trust".into(),
            location: "Leeds".into(),
            country_id: 2,
            certificate_id: 5,
            salary: Some(32000.0),
            job_type: JobType::FullTime,
            experience: None,
            skills: StringList::default(),
            posted_by: Some(1),
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    fn request() -> JobRequest {
        JobRequest {
            title: Some("Staff Nurse".into()),
            description: Some("Ward duties".into()),
            company: Some("NHS Trust".into()),
            location: Some("Leeds".into()),
            country: Some(2),
            certificate: Some(5),
            job_type: Some(JobType::FullTime),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_duplicate_active_job_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![job(1, true)]])
            .into_connection();
        let svc = JobService::new(db);
        assert!(matches!(
            svc.create(request(), 1).await,
            Err(AppError::Duplicate(_))
        ));
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_reactivating_duplicate_job_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![job(3, false)]])
            .append_query_results([vec![job(1, true)]])
            .into_connection();
        let svc = JobService::new(db);
        let req = JobRequest {
            is_active: Some(true),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(3, req).await,
            Err(AppError::Duplicate(_))
        ));
        let log = svc.pool.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(format!("{:?}", log[1]).contains("is_active"));
    }

    #[tokio::test]
    async fn test_negative_salary_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = JobService::new(db);
        let mut req = request();
        req.salary = Some(-10.0);
        assert!(matches!(
            svc.create(req, 1).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_inactive_job_is_still_readable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![job(9, false)]])
            .append_query_results([Vec::<countries::Model>::new()])
            .append_query_results([Vec::<certificates::Model>::new()])
            .into_connection();
        let svc = JobService::new(db);
        let detail = svc.get(9).await.unwrap();
        assert!(!detail.job.is_active);
        assert!(detail.country.is_none());
    }
}
