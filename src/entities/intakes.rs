use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum IntakeMonth {
    #[sea_orm(string_value = "January")]
    January,
    #[sea_orm(string_value = "February")]
    February,
    #[sea_orm(string_value = "March")]
    March,
    #[sea_orm(string_value = "April")]
    April,
    #[sea_orm(string_value = "May")]
    May,
    #[sea_orm(string_value = "June")]
    June,
    #[sea_orm(string_value = "July")]
    July,
    #[sea_orm(string_value = "August")]
    August,
    #[sea_orm(string_value = "September")]
    September,
    #[sea_orm(string_value = "October")]
    October,
    #[sea_orm(string_value = "November")]
    November,
    #[sea_orm(string_value = "December")]
    December,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum IntakeStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "intakes")]
#[serde(rename_all = "camelCase")]
#[schema(as = Intake)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub college_id: i64,
    pub intake_month: IntakeMonth,
    pub intake_year: i32,
    pub deadline_date: DateTime<Utc>,
    pub status: IntakeStatus,
    pub visible: bool,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub deleted_by: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
