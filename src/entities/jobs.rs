use super::json_types::StringList;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum JobType {
    #[sea_orm(string_value = "Full-Time")]
    #[serde(rename = "Full-Time")]
    FullTime,
    #[sea_orm(string_value = "Part-Time")]
    #[serde(rename = "Part-Time")]
    PartTime,
    #[sea_orm(string_value = "Contract")]
    Contract,
    #[sea_orm(string_value = "Internship")]
    Internship,
    #[sea_orm(string_value = "Freelance")]
    Freelance,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "jobs")]
#[serde(rename_all = "camelCase")]
#[schema(as = Job)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `JOB/{YYYY}/{NNN}`
    #[sea_orm(unique)]
    pub job_id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub country_id: i64,
    pub certificate_id: i64,
    pub salary: Option<f64>,
    pub job_type: JobType,
    pub experience: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub skills: StringList,
    pub posted_by: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
