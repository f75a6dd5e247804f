use crate::entities::{ContactStatus, EnquiryStatus, LeadQuality};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryRequest {
    #[serde(rename = "fName")]
    #[schema(example = "Meera")]
    pub f_name: Option<String>,
    pub enq_descp: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub location: Option<String>,
    pub course: Option<String>,
    pub school: Option<String>,
    pub lead_quality: Option<LeadQuality>,
    pub status: Option<EnquiryStatus>,
    pub reference_id: Option<String>,
    pub remarks: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryBrief {
    pub id: i64,
    #[serde(rename = "fName")]
    pub f_name: String,
    pub enq_no: String,
    pub created_at: DateTime<Utc>,
}

/// 未处理询盘汇总
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewEnquirySummary {
    pub count: u64,
    pub enquiries: Vec<EnquiryBrief>,
}

/// SSE 推送内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryNotification {
    pub id: i64,
    #[serde(rename = "fName")]
    pub f_name: String,
    pub enq_no: String,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

impl EnquiryNotification {
    pub fn new(id: i64, f_name: &str, enq_no: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            f_name: f_name.to_string(),
            enq_no: enq_no.to_string(),
            created_at,
            message: format!("It's {f_name}'s Enquiries Notification"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ContactRequest {
    pub fullname: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactStatusRequest {
    pub status: Option<ContactStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactCounts {
    pub total_count: u64,
    pub new_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enquiry_wire_names() {
        let req: EnquiryRequest = serde_json::from_value(json!({
            "fName": "Meera",
            "enqDescp": "MBBS abroad",
            "leadQuality": "High"
        }))
        .unwrap();
        assert_eq!(req.f_name.as_deref(), Some("Meera"));
        assert_eq!(req.lead_quality, Some(LeadQuality::High));
    }

    #[test]
    fn test_notification_message() {
        let n = EnquiryNotification::new(9, "Meera", "Enq09", Utc::now());
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["fName"], "Meera");
        assert_eq!(value["enqNo"], "Enq09");
        assert_eq!(value["message"], "It's Meera's Enquiries Notification");
    }
}
