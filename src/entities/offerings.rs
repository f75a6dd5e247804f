use super::json_types::ServicePoints;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// 对外展示的咨询服务，路由为 /services
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "services")]
#[serde(rename_all = "camelCase")]
#[schema(as = Offering)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub short_desc: String,
    pub full_desc: String,
    pub image: String,
    #[serde(skip_serializing)]
    pub image_public_id: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub points: ServicePoints,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
