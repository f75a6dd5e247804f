use super::json_types::{IdList, StringList};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum CollegeCategory {
    #[sea_orm(string_value = "Graduate")]
    Graduate,
    #[sea_orm(string_value = "Postgraduate")]
    Postgraduate,
    #[sea_orm(string_value = "Diploma")]
    Diploma,
    #[sea_orm(string_value = "PhD")]
    PhD,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum CollegeStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "recommended")]
    Recommended,
    #[sea_orm(string_value = "popular")]
    Popular,
    #[sea_orm(string_value = "regular")]
    Regular,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "colleges")]
#[serde(rename_all = "camelCase")]
#[schema(as = College)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub code: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub desc: Option<String>,
    pub map: Option<String>,
    pub category: CollegeCategory,
    pub status: CollegeStatus,
    #[sea_orm(column_type = "JsonBinary")]
    pub facilities: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub services: StringList,
    pub country_id: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub course_ids: IdList,
    pub image: Option<String>,
    #[serde(skip_serializing)]
    pub image_public_id: Option<String>,
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
