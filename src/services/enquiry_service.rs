use crate::entities::enquiry_entity::{self as enquiries, is_stale};
use crate::entities::EnquiryStatus;
use crate::error::{AppError, AppResult};
use crate::external::Mailer;
use crate::models::{
    Enquiry, EnquiryBrief, EnquiryNotification, EnquiryRequest, NewEnquirySummary,
    PaginatedResponse, PaginationParams,
};
use crate::services::listing::{fetch_list, trimmed};
use crate::services::notifier::EnquiryNotifier;
use crate::utils::sequence::{ENQUIRY_SEQUENCE_KEY, format_enquiry_no, next_sequence_value};
use crate::utils::{normalize_email, require, validate_email};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

pub struct EnquiryService {
    pool: DatabaseConnection,
    mailer: Mailer,
    notifier: EnquiryNotifier,
}

impl EnquiryService {
    pub fn new(pool: DatabaseConnection, mailer: Mailer, notifier: EnquiryNotifier) -> Self {
        Self {
            pool,
            mailer,
            notifier,
        }
    }

    /// 询盘读取不过滤软删除
    async fn find(&self, id: i64) -> AppResult<enquiries::Model> {
        enquiries::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Enquiry not found".to_string()))
    }

    async fn ensure_email_free(&self, email: &str, except: Option<i64>) -> AppResult<()> {
        let mut query = enquiries::Entity::find().filter(enquiries::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(enquiries::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Duplicate(
                "An enquiry with this email already exists".to_string(),
            ));
        }
        Ok(())
    }

    /// Public endpoint; `actor` is set when staff record the enquiry themselves.
    pub async fn create(&self, req: EnquiryRequest, actor: Option<i64>) -> AppResult<Enquiry> {
        let f_name = require(req.f_name.as_deref(), "fName")?.to_string();
        let email = normalize_email(require(req.email.as_deref(), "email")?);
        validate_email(&email)?;
        let mobile = require(req.mobile.as_deref(), "mobile")?.to_string();
        let location = require(req.location.as_deref(), "location")?.to_string();
        let enq_descp = require(req.enq_descp.as_deref(), "enqDescp")?.to_string();
        let course = require(req.course.as_deref(), "course")?.to_string();
        let school = require(req.school.as_deref(), "school")?.to_string();

        self.ensure_email_free(&email, None).await?;

        let seq = next_sequence_value(&self.pool, ENQUIRY_SEQUENCE_KEY).await?;
        let now = Utc::now();
        let model = enquiries::ActiveModel {
            enq_no: Set(format_enquiry_no(seq)),
            f_name: Set(f_name),
            enq_descp: Set(enq_descp),
            email: Set(email),
            mobile: Set(mobile),
            location: Set(location),
            course: Set(course),
            school: Set(school),
            lead_quality: Set(req.lead_quality),
            status: Set(EnquiryStatus::New),
            reference_id: Set(trimmed(req.reference_id)),
            remarks: Set(trimmed(req.remarks)),
            category: Set(trimmed(req.category)),
            created_by: Set(actor),
            updated_by: Set(actor),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Enquiry {} received from {}", model.enq_no, model.email);
        if let Err(e) = self.mailer.send_welcome(&model.email, &model.f_name).await {
            log::error!("Failed to send welcome email to {}: {}", model.email, e);
        }
        self.notifier
            .notify_new_enquiry(&EnquiryNotification::new(
                model.id,
                &model.f_name,
                &model.enq_no,
                model.created_at,
            ))
            .await;
        Ok(model)
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<Enquiry>> {
        let select = enquiries::Entity::find()
            .filter(enquiries::Column::IsDeleted.eq(false))
            .order_by_desc(enquiries::Column::CreatedAt);
        fetch_list(&self.pool, select, params, None).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Enquiry> {
        self.find(id).await
    }

    /// 状态仍为 new 的询盘
    pub async fn new_summary(&self) -> AppResult<NewEnquirySummary> {
        let rows = enquiries::Entity::find()
            .filter(enquiries::Column::Status.eq(EnquiryStatus::New))
            .filter(enquiries::Column::IsDeleted.eq(false))
            .order_by_desc(enquiries::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let enquiries: Vec<EnquiryBrief> = rows
            .into_iter()
            .map(|e| EnquiryBrief {
                id: e.id,
                f_name: e.f_name,
                enq_no: e.enq_no,
                created_at: e.created_at,
            })
            .collect();
        Ok(NewEnquirySummary {
            count: enquiries.len() as u64,
            enquiries,
        })
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(enquiries::Entity::find().count(&self.pool).await?)
    }

    pub async fn update(&self, id: i64, req: EnquiryRequest, actor: i64) -> AppResult<Enquiry> {
        let enquiry = self.find(id).await?;

        let email = match trimmed(req.email) {
            Some(raw) => {
                let email = normalize_email(&raw);
                validate_email(&email)?;
                self.ensure_email_free(&email, Some(id)).await?;
                Some(email)
            }
            None => None,
        };

        let mut am = enquiry.into_active_model();
        if let Some(v) = trimmed(req.f_name) {
            am.f_name = Set(v);
        }
        if let Some(v) = email {
            am.email = Set(v);
        }
        if let Some(v) = trimmed(req.enq_descp) {
            am.enq_descp = Set(v);
        }
        if let Some(v) = trimmed(req.mobile) {
            am.mobile = Set(v);
        }
        if let Some(v) = trimmed(req.location) {
            am.location = Set(v);
        }
        if let Some(v) = trimmed(req.course) {
            am.course = Set(v);
        }
        if let Some(v) = trimmed(req.school) {
            am.school = Set(v);
        }
        if let Some(v) = req.lead_quality {
            am.lead_quality = Set(Some(v));
        }
        if let Some(v) = req.status {
            am.status = Set(v);
        }
        if let Some(v) = req.reference_id {
            am.reference_id = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.remarks {
            am.remarks = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.category {
            am.category = Set(trimmed(Some(v)));
        }
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?)
    }

    pub async fn set_active(&self, id: i64, actor: i64) -> AppResult<Enquiry> {
        let enquiry = self.find(id).await?;
        let mut am = enquiry.into_active_model();
        am.status = Set(EnquiryStatus::Active);
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        let enquiry = am.update(&self.pool).await?;
        log::info!("Enquiry {} marked active", enquiry.enq_no);
        Ok(enquiry)
    }

    pub async fn soft_delete(&self, id: i64, actor: i64) -> AppResult<()> {
        let enquiry = self.find(id).await?;
        let mut am = enquiry.into_active_model();
        am.is_deleted = Set(true);
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        log::info!("Enquiry {} soft deleted", id);
        Ok(())
    }

    /// Moves `new` enquiries untouched for a day to `pending`; returns the ids moved.
    pub async fn age_stale(&self, now: DateTime<Utc>) -> AppResult<Vec<i64>> {
        let candidates = enquiries::Entity::find()
            .filter(enquiries::Column::Status.eq(EnquiryStatus::New))
            .filter(enquiries::Column::IsDeleted.eq(false))
            .all(&self.pool)
            .await?;

        let mut stale = Vec::new();
        for enquiry in &candidates {
            match is_stale(enquiry.created_at, now) {
                Some(true) => stale.push(enquiry.id),
                Some(false) => {}
                None => log::warn!(
                    "Enquiry {} has a future creation date {}, skipped",
                    enquiry.enq_no,
                    enquiry.created_at
                ),
            }
        }
        if stale.is_empty() {
            return Ok(stale);
        }

        let result = enquiries::Entity::update_many()
            .col_expr(enquiries::Column::Status, Expr::value(EnquiryStatus::Pending))
            .col_expr(enquiries::Column::UpdatedAt, Expr::value(now))
            .filter(enquiries::Column::Id.is_in(stale.clone()))
            .exec(&self.pool)
            .await?;
        log::info!(
            "Moved {} stale enquiries to pending",
            result.rows_affected
        );
        Ok(stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn enquiry(id: i64, created_at: DateTime<Utc>) -> enquiries::Model {
        enquiries::Model {
            id,
            enq_no: format_enquiry_no(id),
            f_name: "Meera".into(),
            enq_descp: "MBBS abroad".into(),
            email: format!("meera{id}@example.com"),
            mobile: "9876543210".into(),
            location: "Kochi".into(),
            course: "MBBS".into(),
            school: "St. Mary's".into(),
            lead_quality: None,
            status: EnquiryStatus::New,
            reference_id: None,
            remarks: None,
            category: None,
            created_by: None,
            updated_by: None,
            is_deleted: false,
            created_at,
            updated_at: created_at,
        }
    }

    fn service(db: DatabaseConnection) -> EnquiryService {
        EnquiryService::new(db, Mailer::disabled("Edu Consult"), EnquiryNotifier::new())
    }

    fn request() -> EnquiryRequest {
        EnquiryRequest {
            f_name: Some("Meera".into()),
            enq_descp: Some("MBBS abroad".into()),
            email: Some("Meera@Example.com".into()),
            mobile: Some("9876543210".into()),
            location: Some("Kochi".into()),
            course: Some("MBBS".into()),
            school: Some("St. Mary's".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_numbers_and_broadcasts() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<enquiries::Model>::new()])
            .append_query_results([vec![BTreeMap::from([("value", Value::BigInt(Some(5)))])]])
            .append_query_results([vec![enquiry(5, now)]])
            .into_connection();
        let svc = service(db);
        let (_, mut rx) = svc.notifier.subscribe().await;

        let created = svc.create(request(), None).await.unwrap();
        assert_eq!(created.enq_no, "Enq05");

        let frame = rx.try_recv().unwrap();
        let text = String::from_utf8(frame.to_vec()).unwrap();
        assert!(text.starts_with("event: newEnquiry\n"));
        assert!(text.contains("It's Meera's Enquiries Notification"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![enquiry(1, Utc::now())]])
            .into_connection();
        let svc = service(db);
        assert!(matches!(
            svc.create(request(), None).await,
            Err(AppError::Duplicate(_))
        ));
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_school_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let mut req = request();
        req.school = None;
        assert!(matches!(
            svc.create(req, None).await,
            Err(AppError::ValidationError(m)) if m == "school is required"
        ));
    }

    #[tokio::test]
    async fn test_get_returns_soft_deleted_enquiry() {
        let mut deleted = enquiry(3, Utc::now());
        deleted.is_deleted = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![deleted]])
            .into_connection();
        let svc = service(db);
        assert!(svc.get(3).await.unwrap().is_deleted);
    }

    #[tokio::test]
    async fn test_age_stale_moves_only_old_rows() {
        let now = Utc::now();
        let rows = vec![
            enquiry(1, now - Duration::hours(30)),
            enquiry(2, now - Duration::hours(2)),
            enquiry(3, now + Duration::hours(1)),
            enquiry(4, now - Duration::hours(24)),
            enquiry(5, now - Duration::hours(24) - Duration::minutes(1)),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();
        let svc = service(db);

        assert_eq!(svc.age_stale(now).await.unwrap(), vec![1, 5]);
        let log = svc.pool.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(format!("{:?}", log[1]).contains("pending"));
    }

    #[tokio::test]
    async fn test_age_stale_without_candidates_writes_nothing() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![enquiry(2, now - Duration::hours(1))]])
            .into_connection();
        let svc = service(db);
        assert!(svc.age_stale(now).await.unwrap().is_empty());
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }
}
