use crate::entities::{ContactStatus, contact_entity as contacts};
use crate::error::{AppError, AppResult};
use crate::models::{Contact, ContactCounts, ContactRequest, PaginatedResponse, PaginationParams};
use crate::services::listing::fetch_list;
use crate::utils::{normalize_email, require, validate_email};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

pub struct ContactService {
    pool: DatabaseConnection,
}

impl ContactService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find(&self, id: i64) -> AppResult<contacts::Model> {
        contacts::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Contact message not found".to_string()))
    }

    pub async fn create(&self, req: ContactRequest) -> AppResult<Contact> {
        let fullname = require(req.fullname.as_deref(), "fullname")?.to_string();
        let mobile = require(req.mobile.as_deref(), "mobile")?.to_string();
        let email = normalize_email(require(req.email.as_deref(), "email")?);
        validate_email(&email)?;
        let subject = require(req.subject.as_deref(), "subject")?.to_string();
        let message = require(req.message.as_deref(), "message")?.to_string();

        let now = Utc::now();
        let model = contacts::ActiveModel {
            fullname: Set(fullname),
            mobile: Set(mobile),
            email: Set(email),
            subject: Set(subject),
            message: Set(message),
            status: Set(ContactStatus::New),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Contact message {} received", model.id);
        Ok(model)
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<Contact>> {
        let select = contacts::Entity::find().order_by_desc(contacts::Column::CreatedAt);
        fetch_list(&self.pool, select, params, None).await
    }

    pub async fn set_status(&self, id: i64, status: Option<ContactStatus>) -> AppResult<Contact> {
        let status =
            status.ok_or_else(|| AppError::ValidationError("status is required".to_string()))?;
        let contact = self.find(id).await?;
        let mut am = contact.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let contact = self.find(id).await?;
        contact.delete(&self.pool).await?;
        log::info!("Contact message {} deleted", id);
        Ok(())
    }

    /// 清空全部留言，返回删除条数
    pub async fn delete_all(&self) -> AppResult<u64> {
        let result = contacts::Entity::delete_many().exec(&self.pool).await?;
        log::warn!("Deleted all {} contact messages", result.rows_affected);
        Ok(result.rows_affected)
    }

    pub async fn counts(&self) -> AppResult<ContactCounts> {
        let total_count = contacts::Entity::find().count(&self.pool).await?;
        let new_count = contacts::Entity::find()
            .filter(contacts::Column::Status.eq(ContactStatus::New))
            .count(&self.pool)
            .await?;
        Ok(ContactCounts {
            total_count,
            new_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_status_is_required() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = ContactService::new(db);
        assert!(matches!(
            svc.set_status(1, None).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(svc.pool.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = ContactService::new(db);
        let req = ContactRequest {
            fullname: Some("Arjun".into()),
            mobile: Some("9876543210".into()),
            email: Some("not-an-email".into()),
            subject: Some("Fees".into()),
            message: Some("What are the fees?".into()),
        };
        assert!(svc.create(req).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_all_reports_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 7,
            }])
            .into_connection();
        let svc = ContactService::new(db);
        assert_eq!(svc.delete_all().await.unwrap(), 7);
    }
}
