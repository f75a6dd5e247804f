use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `new` 状态超过该时长未处理即转为 `pending`
pub const STALE_AFTER_HOURS: i64 = 24;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum LeadQuality {
    #[sea_orm(string_value = "High")]
    High,
    #[sea_orm(string_value = "Medium")]
    Medium,
    #[sea_orm(string_value = "Low")]
    Low,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum EnquiryStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "blocked")]
    Blocked,
    #[sea_orm(string_value = "converted")]
    Converted,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "enquiries")]
#[serde(rename_all = "camelCase")]
#[schema(as = Enquiry)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub enq_no: String,
    pub f_name: String,
    pub enq_descp: String,
    #[sea_orm(unique)]
    pub email: String,
    pub mobile: String,
    pub location: String,
    pub course: String,
    pub school: String,
    pub lead_quality: Option<LeadQuality>,
    pub status: EnquiryStatus,
    pub reference_id: Option<String>,
    pub remarks: Option<String>,
    pub category: Option<String>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Age check used by the hourly sweep. Returns `None` for rows dated in the
/// future so the caller can skip and report them.
pub fn is_stale(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<bool> {
    if created_at > now {
        return None;
    }
    Some(now - created_at > Duration::hours(STALE_AFTER_HOURS))
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stale_boundary() {
        let now = Utc::now();
        assert_eq!(is_stale(now - Duration::hours(24), now), Some(false));
        assert_eq!(
            is_stale(now - Duration::hours(24) - Duration::seconds(1), now),
            Some(true)
        );
        assert_eq!(is_stale(now - Duration::hours(30), now), Some(true));
        assert_eq!(
            is_stale(now - Duration::hours(23) - Duration::minutes(59), now),
            Some(false)
        );
    }

    #[test]
    fn test_future_rows_are_flagged() {
        let now = Utc::now();
        assert_eq!(is_stale(now + Duration::minutes(5), now), None);
    }
}
