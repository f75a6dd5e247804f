use crate::entities::{IntakeStatus, college_entity as colleges, intake_entity as intakes};
use crate::error::{AppError, AppResult};
use crate::models::{Intake, IntakeDetail, IntakeRequest, PaginatedResponse, PaginationParams};
use crate::services::listing::{fetch_list, load_by_ids};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

pub struct IntakeService {
    pool: DatabaseConnection,
}

impl IntakeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find_live(&self, id: i64) -> AppResult<intakes::Model> {
        intakes::Entity::find_by_id(id)
            .filter(intakes::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Intake not found".to_string()))
    }

    async fn with_college(&self, rows: Vec<Intake>) -> AppResult<Vec<IntakeDetail>> {
        let college_map = load_by_ids::<colleges::Entity, _>(
            &self.pool,
            colleges::Column::Id,
            rows.iter().map(|i| i.college_id),
            |c| c.id,
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|intake| IntakeDetail {
                college: college_map.get(&intake.college_id).cloned(),
                intake,
            })
            .collect())
    }

    async fn detail(&self, intake: Intake) -> AppResult<IntakeDetail> {
        let mut rows = self.with_college(vec![intake]).await?;
        rows.pop()
            .ok_or_else(|| AppError::InternalError("Intake lookup returned nothing".to_string()))
    }

    pub async fn create(&self, req: IntakeRequest, actor: i64) -> AppResult<IntakeDetail> {
        let now = Utc::now();
        let valid = req
            .validate_new(now)
            .map_err(|errors| AppError::ValidationError(errors.join(", ")))?;

        let model = intakes::ActiveModel {
            college_id: Set(valid.college_id),
            intake_month: Set(valid.intake_month),
            intake_year: Set(valid.intake_year),
            deadline_date: Set(valid.deadline_date),
            status: Set(valid.status),
            visible: Set(valid.visible),
            created_by: Set(Some(actor)),
            updated_by: Set(Some(actor)),
            deleted_by: Set(None),
            deleted_at: Set(None),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Intake {} created for college {} ({:?} {})",
            model.id,
            model.college_id,
            model.intake_month,
            model.intake_year
        );
        self.detail(model).await
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<IntakeDetail>> {
        let select = intakes::Entity::find()
            .filter(intakes::Column::IsDeleted.eq(false))
            .order_by_asc(intakes::Column::DeadlineDate);
        let page = fetch_list(&self.pool, select, params, None).await?;

        let items = self.with_college(page.items).await?;
        Ok(PaginatedResponse {
            items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        })
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(intakes::Entity::find()
            .filter(intakes::Column::IsDeleted.eq(false))
            .count(&self.pool)
            .await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<IntakeDetail> {
        let intake = self.find_live(id).await?;
        self.detail(intake).await
    }

    pub async fn update(&self, id: i64, req: IntakeRequest, actor: i64) -> AppResult<IntakeDetail> {
        let intake = self.find_live(id).await?;
        let changes = req
            .validate_changes(intake.deadline_date, Utc::now())
            .map_err(AppError::ValidationError)?;

        let mut am = intake.into_active_model();
        if let Some(v) = changes.college_id {
            am.college_id = Set(v);
        }
        if let Some(v) = changes.intake_month {
            am.intake_month = Set(v);
        }
        if let Some(v) = changes.intake_year {
            am.intake_year = Set(v);
        }
        if let Some(v) = changes.deadline_date {
            am.deadline_date = Set(v);
        }
        if let Some(v) = changes.status {
            am.status = Set(v);
        }
        if let Some(v) = changes.visible {
            am.visible = Set(v);
        }
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        let intake = am.update(&self.pool).await?;

        self.detail(intake).await
    }

    /// 软删除同时隐藏
    pub async fn soft_delete(&self, id: i64, actor: i64) -> AppResult<()> {
        let intake = self.find_live(id).await?;
        let now = Utc::now();
        let mut am = intake.into_active_model();
        am.is_deleted = Set(true);
        am.visible = Set(false);
        am.deleted_by = Set(Some(actor));
        am.deleted_at = Set(Some(now));
        am.updated_at = Set(now);
        am.update(&self.pool).await?;
        log::info!("Intake {} soft deleted by {}", id, actor);
        Ok(())
    }

    pub async fn hard_delete(&self, id: i64) -> AppResult<()> {
        let intake = intakes::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Intake not found".to_string()))?;
        intake.delete(&self.pool).await?;
        log::info!("Intake {} permanently deleted", id);
        Ok(())
    }

    /// Closes every open, live intake whose deadline is at or before `now`.
    pub async fn close_elapsed(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = intakes::Entity::update_many()
            .col_expr(intakes::Column::Status, Expr::value(IntakeStatus::Closed))
            .col_expr(intakes::Column::UpdatedAt, Expr::value(now))
            .filter(intakes::Column::Status.eq(IntakeStatus::Open))
            .filter(intakes::Column::IsDeleted.eq(false))
            .filter(intakes::Column::DeadlineDate.lte(now))
            .exec(&self.pool)
            .await?;

        if result.rows_affected > 0 {
            log::info!("Closed {} intakes past their deadline", result.rows_affected);
        }
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::IntakeMonth;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn intake(id: i64, deadline: DateTime<Utc>) -> intakes::Model {
        let now = Utc::now();
        intakes::Model {
            id,
            college_id: 3,
            intake_month: IntakeMonth::September,
            intake_year: 2026,
            deadline_date: deadline,
            status: IntakeStatus::Closed,
            visible: true,
            created_by: None,
            updated_by: None,
            deleted_by: None,
            deleted_at: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_invalid_create_reports_all_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = IntakeService::new(db);
        let err = svc.create(IntakeRequest::default(), 1).await.unwrap_err();
        match err {
            AppError::ValidationError(msg) => {
                assert!(msg.contains("College is required"));
                assert!(msg.contains("Deadline date is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(svc.pool.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_with_past_stored_deadline_is_rejected() {
        let past = Utc::now() - Duration::days(3);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![intake(8, past)]])
            .into_connection();
        let svc = IntakeService::new(db);
        let req = IntakeRequest {
            status: Some("open".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(8, req, 1).await,
            Err(AppError::ValidationError(m)) if m == "Cannot set status to open for a past deadline"
        ));
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_close_elapsed_is_one_batch_update() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 4,
            }])
            .into_connection();
        let svc = IntakeService::new(db);
        assert_eq!(svc.close_elapsed(Utc::now()).await.unwrap(), 4);

        let log = svc.pool.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("UPDATE"));
        assert!(sql.contains("closed"));
        // 截止当天也关闭
        assert!(sql.contains("deadline_date") && sql.contains("<="));
    }
}
