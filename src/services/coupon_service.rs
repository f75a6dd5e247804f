use crate::entities::coupon_entity::{self as coupons, Redeemability};
use crate::entities::CouponStatus;
use crate::error::{AppError, AppResult};
use crate::models::{Coupon, CouponRequest, PaginatedResponse, PaginationParams};
use crate::services::listing::{fetch_list, trimmed};
use crate::utils::require;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};

pub struct CouponService {
    pool: DatabaseConnection,
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn check_discount(discount: f64) -> AppResult<f64> {
    if !(0.0..=100.0).contains(&discount) {
        return Err(AppError::ValidationError(
            "discount must be between 0 and 100".to_string(),
        ));
    }
    Ok(discount)
}

/// Looks a coupon up by code and checks it can be redeemed at `now`.
/// An active coupon found past its end date is marked expired on the way out.
pub async fn redeemable_coupon(
    db: &DatabaseConnection,
    code: &str,
    now: DateTime<Utc>,
) -> AppResult<coupons::Model> {
    let code = normalize_code(code);
    let coupon = coupons::Entity::find()
        .filter(coupons::Column::Code.eq(code.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))?;

    let verdict = coupon.redeemability(now);
    if verdict == Redeemability::Expired && coupon.status != CouponStatus::Expired {
        coupons::Entity::update_many()
            .col_expr(coupons::Column::Status, Expr::value(CouponStatus::Expired))
            .col_expr(coupons::Column::UpdatedAt, Expr::value(now))
            .filter(coupons::Column::Id.eq(coupon.id))
            .exec(db)
            .await?;
        log::info!("Coupon {} passed its end date, marked expired", coupon.code);
    }
    if verdict != Redeemability::Redeemable {
        log::warn!("Coupon {} rejected: {:?}", coupon.code, verdict);
    }
    verdict.into_result()?;
    Ok(coupon)
}

impl CouponService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find(&self, id: i64) -> AppResult<coupons::Model> {
        coupons::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))
    }

    async fn ensure_code_free(&self, code: &str, except: Option<i64>) -> AppResult<()> {
        let mut query = coupons::Entity::find().filter(coupons::Column::Code.eq(code));
        if let Some(id) = except {
            query = query.filter(coupons::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Duplicate(
                "Coupon with this code already exists".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, req: CouponRequest) -> AppResult<Coupon> {
        let coupon_title = require(req.coupon_title.as_deref(), "couponTitle")?.to_string();
        let code = normalize_code(require(req.code.as_deref(), "code")?);
        let discount = check_discount(
            req.discount
                .ok_or_else(|| AppError::ValidationError("discount is required".to_string()))?,
        )?;
        let end_date = req
            .end_date
            .ok_or_else(|| AppError::ValidationError("endDate is required".to_string()))?;

        self.ensure_code_free(&code, None).await?;

        let now = Utc::now();
        let model = coupons::ActiveModel {
            coupon_title: Set(coupon_title),
            code: Set(code),
            discount: Set(discount),
            end_date: Set(end_date),
            status: Set(req.status.unwrap_or(CouponStatus::Active)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Coupon {} created", model.code);
        Ok(model)
    }

    pub async fn validate(&self, code: Option<&str>) -> AppResult<Coupon> {
        let code = require(code, "code")?;
        redeemable_coupon(&self.pool, code, Utc::now()).await
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<Coupon>> {
        let select = coupons::Entity::find().order_by_desc(coupons::Column::CreatedAt);
        fetch_list(&self.pool, select, params, None).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Coupon> {
        self.find(id).await
    }

    pub async fn update(&self, id: i64, req: CouponRequest) -> AppResult<Coupon> {
        let coupon = self.find(id).await?;

        let code = trimmed(req.code).map(|c| normalize_code(&c));
        if let Some(code) = &code {
            self.ensure_code_free(code, Some(id)).await?;
        }
        let discount = req.discount.map(check_discount).transpose()?;

        let mut am = coupon.into_active_model();
        if let Some(v) = trimmed(req.coupon_title) {
            am.coupon_title = Set(v);
        }
        if let Some(v) = code {
            am.code = Set(v);
        }
        if let Some(v) = discount {
            am.discount = Set(v);
        }
        if let Some(v) = req.end_date {
            am.end_date = Set(v);
        }
        if let Some(v) = req.status {
            am.status = Set(v);
        }
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let coupon = self.find(id).await?;
        coupon.delete(&self.pool).await?;
        log::info!("Coupon {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    pub(crate) fn coupon(status: CouponStatus, end_date: DateTime<Utc>) -> coupons::Model {
        let now = Utc::now();
        coupons::Model {
            id: 1,
            coupon_title: "Launch".into(),
            code: "LAUNCH20".into(),
            discount: 20.0,
            end_date,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<coupons::Model>::new()])
            .into_connection();
        let svc = CouponService::new(db);
        assert!(matches!(
            svc.validate(Some("nope")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_inactive_coupon_is_rejected_without_writes() {
        let future = Utc::now() + Duration::days(5);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![coupon(CouponStatus::Inactive, future)]])
            .into_connection();
        let svc = CouponService::new(db);
        assert!(matches!(
            svc.validate(Some("launch20")).await,
            Err(AppError::ValidationError(m)) if m == "Coupon is inactive"
        ));
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_past_end_date_marks_coupon_expired() {
        let past = Utc::now() - Duration::days(1);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![coupon(CouponStatus::Active, past)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = CouponService::new(db);
        assert!(matches!(
            svc.validate(Some("LAUNCH20")).await,
            Err(AppError::ValidationError(m)) if m == "Coupon has expired"
        ));

        let log = svc.pool.into_transaction_log();
        assert_eq!(log.len(), 2);
        let update = format!("{:?}", log[1]);
        assert!(update.contains("UPDATE"));
        assert!(update.contains("expired"));
    }

    #[tokio::test]
    async fn test_valid_coupon_is_returned() {
        let future = Utc::now() + Duration::days(5);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![coupon(CouponStatus::Active, future)]])
            .into_connection();
        let svc = CouponService::new(db);
        let found = svc.validate(Some(" launch20 ")).await.unwrap();
        assert_eq!(found.code, "LAUNCH20");
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected() {
        let future = Utc::now() + Duration::days(5);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![coupon(CouponStatus::Active, future)]])
            .into_connection();
        let svc = CouponService::new(db);
        let req = CouponRequest {
            coupon_title: Some("Again".into()),
            code: Some("launch20".into()),
            discount: Some(10.0),
            end_date: Some(future),
            status: None,
        };
        assert!(matches!(svc.create(req).await, Err(AppError::Duplicate(_))));
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[test]
    fn test_discount_range() {
        assert!(check_discount(0.0).is_ok());
        assert!(check_discount(100.0).is_ok());
        assert!(check_discount(100.5).is_err());
        assert!(check_discount(-1.0).is_err());
    }
}
