use crate::entities::JobType;
use crate::models::{Certificate, Country, Job};
use crate::utils::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    #[schema(example = "Staff Nurse")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    /// country id
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub country: Option<i64>,
    /// certificate id
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub certificate: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub salary: Option<f64>,
    pub job_type: Option<JobType>,
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string_list")]
    pub skills: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub country: Option<Country>,
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    pub title: Option<String>,
    #[schema(example = "NMC-UK-2026")]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub country: Option<i64>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub issue_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDetail {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub country: Option<Country>,
}
