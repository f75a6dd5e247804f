use crate::entities::{certificate_entity as certificates, country_entity as countries};
use crate::error::{AppError, AppResult};
use crate::models::{
    Certificate, CertificateDetail, CertificateRequest, PaginatedResponse, PaginationParams,
};
use crate::services::listing::{fetch_list, load_by_ids, trimmed};
use crate::utils::require;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

pub struct CertificateService {
    pool: DatabaseConnection,
}

impl CertificateService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find(&self, id: i64) -> AppResult<certificates::Model> {
        certificates::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))
    }

    async fn ensure_reference_free(&self, reference: &str, except: Option<i64>) -> AppResult<()> {
        let mut query = certificates::Entity::find().filter(certificates::Column::Reference.eq(reference));
        if let Some(id) = except {
            query = query.filter(certificates::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Duplicate(
                "Certificate with this reference already exists".to_string(),
            ));
        }
        Ok(())
    }

    async fn with_country(&self, rows: Vec<Certificate>) -> AppResult<Vec<CertificateDetail>> {
        let country_map = load_by_ids::<countries::Entity, _>(
            &self.pool,
            countries::Column::Id,
            rows.iter().map(|c| c.country_id),
            |c| c.id,
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|certificate| CertificateDetail {
                country: country_map.get(&certificate.country_id).cloned(),
                certificate,
            })
            .collect())
    }

    async fn detail(&self, certificate: Certificate) -> AppResult<CertificateDetail> {
        let mut rows = self.with_country(vec![certificate]).await?;
        rows.pop().ok_or_else(|| {
            AppError::InternalError("Certificate lookup returned nothing".to_string())
        })
    }

    pub async fn create(&self, req: CertificateRequest) -> AppResult<CertificateDetail> {
        let title = require(req.title.as_deref(), "title")?.to_string();
        let reference = require(req.reference.as_deref(), "reference")?.to_string();
        let description = require(req.description.as_deref(), "description")?.to_string();
        let country_id = req
            .country
            .ok_or_else(|| AppError::ValidationError("country is required".to_string()))?;

        self.ensure_reference_free(&reference, None).await?;

        let now = Utc::now();
        let model = certificates::ActiveModel {
            title: Set(title),
            reference: Set(reference),
            country_id: Set(country_id),
            description: Set(description),
            issue_date: Set(req.issue_date),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Certificate {} ({}) created", model.id, model.reference);
        self.detail(model).await
    }

    pub async fn list(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CertificateDetail>> {
        let select = certificates::Entity::find().order_by_desc(certificates::Column::CreatedAt);
        let page = fetch_list(&self.pool, select, params, None).await?;

        let items = self.with_country(page.items).await?;
        Ok(PaginatedResponse {
            items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        })
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(certificates::Entity::find().count(&self.pool).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<CertificateDetail> {
        let certificate = self.find(id).await?;
        self.detail(certificate).await
    }

    pub async fn update(&self, id: i64, req: CertificateRequest) -> AppResult<CertificateDetail> {
        let certificate = self.find(id).await?;

        let reference = trimmed(req.reference);
        if let Some(reference) = &reference {
            self.ensure_reference_free(reference, Some(id)).await?;
        }

        let mut am = certificate.into_active_model();
        if let Some(v) = trimmed(req.title) {
            am.title = Set(v);
        }
        if let Some(v) = reference {
            am.reference = Set(v);
        }
        if let Some(v) = trimmed(req.description) {
            am.description = Set(v);
        }
        if let Some(v) = req.country {
            am.country_id = Set(v);
        }
        if let Some(v) = req.issue_date {
            am.issue_date = Set(Some(v));
        }
        am.updated_at = Set(Utc::now());
        let certificate = am.update(&self.pool).await?;

        self.detail(certificate).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let certificate = self.find(id).await?;
        certificate.delete(&self.pool).await?;
        log::info!("Certificate {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn certificate(id: i64) -> certificates::Model {
        let now = Utc::now();
        certificates::Model {
            id,
            title: "NMC Registration".into(),
            reference: "NMC-UK-2026".into(),
            country_id: 2,
            description: "UK nursing registration".into(),
            issue_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_reference_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![certificate(1)]])
            .into_connection();
        let svc = CertificateService::new(db);
        let req = CertificateRequest {
            title: Some("Another".into()),
            reference: Some("NMC-UK-2026".into()),
            country: Some(2),
            description: Some("dup".into()),
            ..Default::default()
        };
        assert!(matches!(svc.create(req).await, Err(AppError::Duplicate(_))));
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_certificate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<certificates::Model>::new()])
            .into_connection();
        let svc = CertificateService::new(db);
        assert!(matches!(svc.delete(4).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![certificate(4)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = CertificateService::new(db);
        svc.delete(4).await.unwrap();
        let log = svc.pool.into_transaction_log();
        assert!(format!("{:?}", log[1]).contains("DELETE"));
    }
}
