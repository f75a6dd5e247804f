use super::json_types::StringList;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum CourseMode {
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "offline")]
    Offline,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "courses")]
#[serde(rename_all = "camelCase")]
#[schema(as = Course)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub duration: String,
    pub category: String,
    pub mode: CourseMode,
    pub fees: f64,
    pub image: Option<String>,
    #[serde(skip_serializing)]
    pub image_public_id: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub syllabus: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub prerequisites: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: StringList,
    pub visible: bool,
    pub is_deleted: bool,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
