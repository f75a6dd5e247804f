use crate::entities::CourseMode;
use crate::utils::lenient;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SHORT_DESCRIPTION_MAX: usize = 300;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    #[schema(example = "IELTS Preparation")]
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    #[schema(example = "3 months")]
    pub duration: Option<String>,
    pub category: Option<String>,
    pub mode: Option<CourseMode>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub fees: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string_list")]
    pub syllabus: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_string_list")]
    pub prerequisites: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::opt_string_list")]
    pub tags: Option<Vec<String>>,
    pub visible: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CourseListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub visible: Option<bool>,
}
