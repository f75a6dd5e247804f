use crate::entities::{
    CandidateStatus, EducationDetail, Gender, GuardianRelation, IdentityType, candidate_entity,
};
use crate::models::{Country, Job, Package};
use crate::utils::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration and update share one shape; registration checks the
/// required fields itself.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRequest {
    #[schema(example = "ravi@example.com")]
    pub email: Option<String>,
    #[schema(example = "9876543210")]
    pub mobile: Option<String>,
    /// 未提供时由出生日期生成
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    #[schema(example = "05/07/2001")]
    pub dob: Option<String>,
    pub identity_type: Option<IdentityType>,
    pub identity_number: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub landmark: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    /// country id
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub country: Option<i64>,
    pub guardian_name: Option<String>,
    pub guardian_relation: Option<GuardianRelation>,
    pub guardian_mobile: Option<String>,
    pub guardian_occupation: Option<String>,
    pub education_details: Option<Vec<EducationDetail>>,
    pub highest_qualification: Option<String>,
    pub university: Option<String>,
    pub passing_year: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub preferred_job: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub package_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub id: i64,
    pub can_id: String,
    pub email: String,
    pub mobile: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub dob: String,
    pub image: String,
    pub identity_type: Option<IdentityType>,
    pub identity_number: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub landmark: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country_id: i64,
    pub guardian_name: Option<String>,
    pub guardian_relation: Option<GuardianRelation>,
    pub guardian_mobile: Option<String>,
    pub guardian_occupation: Option<String>,
    pub education_details: Vec<EducationDetail>,
    pub highest_qualification: Option<String>,
    pub university: Option<String>,
    pub passing_year: Option<String>,
    pub preferred_job_id: Option<i64>,
    pub package_id: Option<i64>,
    pub status: CandidateStatus,
    pub is_deleted: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<candidate_entity::Model> for CandidateResponse {
    fn from(c: candidate_entity::Model) -> Self {
        Self {
            full_name: c.full_name(),
            id: c.id,
            can_id: c.can_id,
            email: c.email,
            mobile: c.mobile,
            first_name: c.first_name,
            last_name: c.last_name,
            gender: c.gender,
            dob: c.dob,
            image: c.image,
            identity_type: c.identity_type,
            identity_number: c.identity_number,
            address_line1: c.address_line1,
            address_line2: c.address_line2,
            landmark: c.landmark,
            city: c.city,
            district: c.district,
            state: c.state,
            zip_code: c.zip_code,
            country_id: c.country_id,
            guardian_name: c.guardian_name,
            guardian_relation: c.guardian_relation,
            guardian_mobile: c.guardian_mobile,
            guardian_occupation: c.guardian_occupation,
            education_details: c.education_details.0,
            highest_qualification: c.highest_qualification,
            university: c.university,
            passing_year: c.passing_year,
            preferred_job_id: c.preferred_job_id,
            package_id: c.package_id,
            status: c.status,
            is_deleted: c.is_deleted,
            last_login: c.last_login,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// 详情接口：带上国家、意向岗位和套餐
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDetail {
    #[serde(flatten)]
    pub candidate: CandidateResponse,
    pub country: Option<Country>,
    pub preferred_job: Option<Job>,
    pub package: Option<Package>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRegistered {
    pub id: i64,
    #[schema(example = "CAN2026007")]
    pub can_id: String,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub candidate: CandidateResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_accepts_form_text_ids() {
        let req: CandidateRequest = serde_json::from_value(json!({
            "email": "ravi@example.com",
            "mobile": "9876543210",
            "dob": "05/07/2001",
            "country": "3",
            "preferredJob": 12,
            "identityType": "voterId",
            "educationDetails": [{ "qualification": "BSc", "passingYear": "2022" }]
        }))
        .unwrap();
        assert_eq!(req.country, Some(3));
        assert_eq!(req.preferred_job, Some(12));
        assert_eq!(req.identity_type, Some(IdentityType::VoterId));
        let details = req.education_details.unwrap();
        assert_eq!(details[0].passing_year.as_deref(), Some("2022"));
    }
}
