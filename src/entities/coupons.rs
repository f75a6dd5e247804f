use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "coupons")]
#[serde(rename_all = "camelCase")]
#[schema(as = Coupon)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub coupon_title: String,
    #[sea_orm(unique)]
    pub code: String,
    /// 折扣百分比 0-100
    pub discount: f64,
    pub end_date: DateTime<Utc>,
    pub status: CouponStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 兑换检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redeemability {
    Redeemable,
    Inactive,
    /// 需要把状态落库为 expired
    Expired,
}

impl Model {
    pub fn redeemability(&self, now: DateTime<Utc>) -> Redeemability {
        match self.status {
            CouponStatus::Inactive => Redeemability::Inactive,
            CouponStatus::Expired => Redeemability::Expired,
            CouponStatus::Active if self.end_date < now => Redeemability::Expired,
            CouponStatus::Active => Redeemability::Redeemable,
        }
    }
}

impl Redeemability {
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Redeemability::Redeemable => Ok(()),
            Redeemability::Inactive => Err(AppError::ValidationError(
                "Coupon is inactive".to_string(),
            )),
            Redeemability::Expired => {
                Err(AppError::ValidationError("Coupon has expired".to_string()))
            }
        }
    }
}

/// `rate × (1 − discount/100)` rounded to two decimals.
pub fn discounted_rate(rate: f64, discount: f64) -> f64 {
    (rate * (1.0 - discount / 100.0) * 100.0).round() / 100.0
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(status: CouponStatus, end_date: DateTime<Utc>) -> Model {
        let now = Utc::now();
        Model {
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

    #[test]
    fn test_redeemability() {
        let now = Utc::now();
        let future = now + Duration::days(3);
        let past = now - Duration::days(1);
        assert_eq!(
            coupon(CouponStatus::Active, future).redeemability(now),
            Redeemability::Redeemable
        );
        assert_eq!(
            coupon(CouponStatus::Inactive, future).redeemability(now),
            Redeemability::Inactive
        );
        assert_eq!(
            coupon(CouponStatus::Active, past).redeemability(now),
            Redeemability::Expired
        );
        assert_eq!(
            coupon(CouponStatus::Expired, future).redeemability(now),
            Redeemability::Expired
        );
    }

    #[test]
    fn test_discounted_rate() {
        assert_eq!(discounted_rate(100.0, 20.0), 80.0);
        assert_eq!(discounted_rate(999.0, 15.0), 849.15);
        assert_eq!(discounted_rate(10.0, 33.0), 6.7);
        assert_eq!(discounted_rate(50.0, 0.0), 50.0);
        assert_eq!(discounted_rate(50.0, 100.0), 0.0);
    }
}
