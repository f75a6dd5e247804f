use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "countries")]
#[serde(rename_all = "camelCase")]
#[schema(as = Country)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(unique)]
    pub iso_code: String,
    pub dial_code: String,
    pub currency: String,
    pub image: Option<String>,
    #[serde(skip_serializing)]
    pub image_public_id: Option<String>,
    pub is_domestic: bool,
    pub is_default: bool,
    pub is_deleted: bool,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
