//! Blog, gallery and service-offering payloads.

use crate::entities::ServicePoint;
use crate::utils::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogRequest {
    pub title: Option<String>,
    pub short_desc: Option<String>,
    pub full_desc: Option<String>,
    #[schema(example = "study-in-canada-2026")]
    pub link: Option<String>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct GalleryRequest {
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub date: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub from: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferingRequest {
    pub title: Option<String>,
    pub short_desc: Option<String>,
    pub full_desc: Option<String>,
    pub points: Option<Vec<ServicePoint>>,
}
