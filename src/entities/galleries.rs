use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "galleries")]
#[serde(rename_all = "camelCase")]
#[schema(as = GalleryItem)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub image: String,
    #[serde(skip_serializing)]
    pub image_public_id: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub title: Option<String>,
    #[sea_orm(column_name = "from")]
    #[serde(rename = "from")]
    pub source: Option<String>,
    pub link: Option<String>,
    pub is_deleted: bool,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
