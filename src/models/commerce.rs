//! Coupons and subscription packages.

use crate::entities::{CouponStatus, PackageStatus, PackageType};
use crate::models::Package;
use crate::utils::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponRequest {
    #[schema(example = "Launch offer")]
    pub coupon_title: Option<String>,
    #[schema(example = "LAUNCH20")]
    pub code: Option<String>,
    /// 0-100
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<CouponStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateCouponRequest {
    #[schema(example = "LAUNCH20")]
    pub code: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rate: Option<f64>,
    #[serde(rename = "type")]
    pub package_type: Option<PackageType>,
    #[serde(default, deserialize_with = "lenient::opt_string_list")]
    pub points: Option<Vec<String>>,
    pub status: Option<PackageStatus>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    pub coupon_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub package_id: Option<i64>,
}

/// 仅用于展示，不落库
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponResponse {
    #[serde(flatten)]
    pub package: Package,
    pub original_rate: f64,
    pub discounted_rate: f64,
    pub coupon_code: String,
    pub discount_percentage: f64,
}
