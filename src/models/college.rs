use crate::entities::{CollegeCategory, CollegeStatus};
use crate::models::{College, Country, Course, PaginationParams};
use crate::utils::lenient;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollegeRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub desc: Option<String>,
    pub map: Option<String>,
    pub category: Option<CollegeCategory>,
    pub status: Option<CollegeStatus>,
    #[serde(default, deserialize_with = "lenient::opt_string_list")]
    pub facilities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_string_list")]
    pub services: Option<Vec<String>>,
    /// country id
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub country: Option<i64>,
    /// course ids
    #[serde(default, deserialize_with = "lenient::opt_id_list")]
    pub courses: Option<Vec<i64>>,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CollegeListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// 名称模糊匹配
    pub search: Option<String>,
    pub category: Option<CollegeCategory>,
    pub status: Option<CollegeStatus>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub country: Option<i64>,
}

impl CollegeListQuery {
    pub const DEFAULT_LIMIT: u64 = 10;

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeDetail {
    #[serde(flatten)]
    pub college: College,
    pub country: Option<Country>,
    pub courses: Vec<Course>,
}
