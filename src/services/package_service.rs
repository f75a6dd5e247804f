use crate::entities::coupon_entity::discounted_rate;
use crate::entities::{PackageStatus, PackageType, StringList, package_entity as packages};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApplyCouponRequest, ApplyCouponResponse, Package, PackageRequest, PaginatedResponse,
    PaginationParams,
};
use crate::services::coupon_service::redeemable_coupon;
use crate::services::listing::{fetch_list, trimmed};
use crate::utils::require;
use crate::utils::sequence::{PACKAGE_SEQUENCE_KEY, format_package_id, next_sequence_value};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryOrder, Set,
};

pub struct PackageService {
    pool: DatabaseConnection,
}

fn check_rate(rate: f64) -> AppResult<f64> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(AppError::ValidationError(
            "rate must be a non-negative number".to_string(),
        ));
    }
    Ok(rate)
}

impl PackageService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find(&self, id: i64) -> AppResult<packages::Model> {
        packages::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Package not found".to_string()))
    }

    pub async fn create(&self, req: PackageRequest) -> AppResult<Package> {
        let title = require(req.title.as_deref(), "title")?.to_string();
        let rate = check_rate(
            req.rate
                .ok_or_else(|| AppError::ValidationError("rate is required".to_string()))?,
        )?;

        let seq = next_sequence_value(&self.pool, PACKAGE_SEQUENCE_KEY).await?;
        let now = Utc::now();
        let model = packages::ActiveModel {
            pack_id: Set(format_package_id(seq)),
            title: Set(title),
            description: Set(trimmed(req.description)),
            rate: Set(rate),
            package_type: Set(req.package_type.unwrap_or(PackageType::Month)),
            points: Set(StringList(req.points.unwrap_or_default())),
            status: Set(req.status.unwrap_or(PackageStatus::New)),
            is_active: Set(req.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Package {} created", model.pack_id);
        Ok(model)
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<Package>> {
        let select = packages::Entity::find().order_by_asc(packages::Column::CreatedAt);
        fetch_list(&self.pool, select, params, None).await
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(packages::Entity::find().count(&self.pool).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Package> {
        self.find(id).await
    }

    pub async fn update(&self, id: i64, req: PackageRequest) -> AppResult<Package> {
        let package = self.find(id).await?;
        let rate = req.rate.map(check_rate).transpose()?;

        let mut am = package.into_active_model();
        if let Some(v) = trimmed(req.title) {
            am.title = Set(v);
        }
        if let Some(v) = req.description {
            am.description = Set(trimmed(Some(v)));
        }
        if let Some(v) = rate {
            am.rate = Set(v);
        }
        if let Some(v) = req.package_type {
            am.package_type = Set(v);
        }
        if let Some(v) = req.points {
            am.points = Set(StringList(v));
        }
        if let Some(v) = req.status {
            am.status = Set(v);
        }
        if let Some(v) = req.is_active {
            am.is_active = Set(v);
        }
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let package = self.find(id).await?;
        package.delete(&self.pool).await?;
        log::info!("Package {} deleted", id);
        Ok(())
    }

    /// 预览折后价，不落库
    pub async fn apply_coupon(&self, req: ApplyCouponRequest) -> AppResult<ApplyCouponResponse> {
        let code = require(req.coupon_code.as_deref(), "couponCode")?;
        let package_id = req
            .package_id
            .ok_or_else(|| AppError::ValidationError("packageId is required".to_string()))?;

        let coupon = redeemable_coupon(&self.pool, code, Utc::now()).await?;
        let package = self.find(package_id).await?;

        Ok(ApplyCouponResponse {
            original_rate: package.rate,
            discounted_rate: discounted_rate(package.rate, coupon.discount),
            coupon_code: coupon.code,
            discount_percentage: coupon.discount,
            package,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CouponStatus;
    use crate::services::coupon_service::tests::coupon;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn package(id: i64, rate: f64) -> packages::Model {
        let now = Utc::now();
        packages::Model {
            id,
            pack_id: format_package_id(id),
            title: "Gold".into(),
            description: None,
            rate,
            package_type: PackageType::Year,
            points: StringList::default(),
            status: PackageStatus::Popular,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_apply_coupon_persists_nothing() {
        let future = Utc::now() + Duration::days(10);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![coupon(CouponStatus::Active, future)]])
            .append_query_results([vec![package(3, 100.0)]])
            .into_connection();
        let svc = PackageService::new(db);

        let resp = svc
            .apply_coupon(ApplyCouponRequest {
                coupon_code: Some("launch20".into()),
                package_id: Some(3),
            })
            .await
            .unwrap();
        assert_eq!(resp.original_rate, 100.0);
        assert_eq!(resp.discounted_rate, 80.0);
        assert_eq!(resp.coupon_code, "LAUNCH20");
        assert_eq!(resp.discount_percentage, 20.0);

        let log = svc.pool.into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|t| format!("{t:?}").contains("SELECT")));
    }

    #[tokio::test]
    async fn test_create_assigns_pack_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([("value", Value::BigInt(Some(3)))])]])
            .append_query_results([vec![package(3, 4999.0)]])
            .into_connection();
        let svc = PackageService::new(db);
        let created = svc
            .create(PackageRequest {
                title: Some("Gold".into()),
                rate: Some(4999.0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.pack_id, "PAC003");
    }

    #[tokio::test]
    async fn test_negative_rate_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = PackageService::new(db);
        let req = PackageRequest {
            title: Some("Gold".into()),
            rate: Some(-5.0),
            ..Default::default()
        };
        assert!(svc.create(req).await.is_err());
        assert!(svc.pool.into_transaction_log().is_empty());
    }
}
