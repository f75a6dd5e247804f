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
pub enum PackageType {
    #[sea_orm(string_value = "month")]
    Month,
    #[sea_orm(string_value = "year")]
    Year,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    #[sea_orm(string_value = "recommended")]
    Recommended,
    #[sea_orm(string_value = "popular")]
    Popular,
    #[sea_orm(string_value = "new")]
    New,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "packages")]
#[serde(rename_all = "camelCase")]
#[schema(as = Package)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `PAC{NNN}`
    #[sea_orm(unique)]
    pub pack_id: String,
    pub title: String,
    pub description: Option<String>,
    pub rate: f64,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub package_type: PackageType,
    #[sea_orm(column_type = "JsonBinary")]
    pub points: StringList,
    pub status: PackageStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
