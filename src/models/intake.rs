use crate::entities::{IntakeMonth, IntakeStatus};
use crate::models::{College, Intake};
use crate::utils::lenient;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Month and status stay raw text so one request reports every problem at once.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    /// college id
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub college: Option<i64>,
    #[schema(example = "September")]
    pub intake_month: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub intake_year: Option<i32>,
    #[schema(example = "2026-07-31")]
    pub deadline_date: Option<String>,
    #[schema(example = "open")]
    pub status: Option<String>,
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidIntake {
    pub college_id: i64,
    pub intake_month: IntakeMonth,
    pub intake_year: i32,
    pub deadline_date: DateTime<Utc>,
    pub status: IntakeStatus,
    pub visible: bool,
}

/// 解析后的部分更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeChanges {
    pub college_id: Option<i64>,
    pub intake_month: Option<IntakeMonth>,
    pub intake_year: Option<i32>,
    pub deadline_date: Option<DateTime<Utc>>,
    pub status: Option<IntakeStatus>,
    pub visible: Option<bool>,
}

impl FromStr for IntakeMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let month = match s.trim().to_ascii_lowercase().as_str() {
            "january" => IntakeMonth::January,
            "february" => IntakeMonth::February,
            "march" => IntakeMonth::March,
            "april" => IntakeMonth::April,
            "may" => IntakeMonth::May,
            "june" => IntakeMonth::June,
            "july" => IntakeMonth::July,
            "august" => IntakeMonth::August,
            "september" => IntakeMonth::September,
            "october" => IntakeMonth::October,
            "november" => IntakeMonth::November,
            "december" => IntakeMonth::December,
            _ => return Err(format!("Invalid intake month: {s}")),
        };
        Ok(month)
    }
}

fn parse_status(raw: &str) -> Result<IntakeStatus, String> {
    match raw.trim() {
        "open" => Ok(IntakeStatus::Open),
        "closed" => Ok(IntakeStatus::Closed),
        _ => Err(r#"Status must be either "open" or "closed""#.to_string()),
    }
}

impl IntakeRequest {
    pub fn validate_new(&self, now: DateTime<Utc>) -> Result<ValidIntake, Vec<String>> {
        let mut errors = Vec::new();

        if self.college.is_none() {
            errors.push("College is required and cannot be empty".to_string());
        }

        let month = match self.intake_month.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Intake month is required and cannot be empty".to_string());
                None
            }
            Some(raw) => raw.parse::<IntakeMonth>().map_err(|e| errors.push(e)).ok(),
        };

        match self.intake_year {
            None => errors.push("Intake year is required and must be a valid number".to_string()),
            Some(year) if year < now.year() => {
                errors.push("Intake year cannot be in the past".to_string())
            }
            Some(_) => {}
        }

        let deadline = match self.deadline_date.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Deadline date is required".to_string());
                None
            }
            Some(raw) => {
                let parsed = lenient::parse_datetime(raw);
                if parsed.is_none() {
                    errors.push("Deadline date must be a valid date".to_string());
                }
                parsed
            }
        };

        let status = match self.status.as_deref() {
            None => Some(IntakeStatus::Open),
            Some(raw) => parse_status(raw).map_err(|e| errors.push(e)).ok(),
        };

        match (self.college, month, self.intake_year, deadline, status) {
            (Some(college_id), Some(intake_month), Some(intake_year), Some(deadline_date), Some(status))
                if errors.is_empty() =>
            {
                Ok(ValidIntake {
                    college_id,
                    intake_month,
                    intake_year,
                    deadline_date,
                    status,
                    visible: self.visible.unwrap_or(true),
                })
            }
            _ => Err(errors),
        }
    }

    /// `stored_deadline` is used when the request leaves the deadline alone.
    pub fn validate_changes(
        &self,
        stored_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<IntakeChanges, String> {
        let intake_month = match self.intake_month.as_deref().map(str::trim) {
            None => None,
            Some("") => return Err("Intake month cannot be empty".to_string()),
            Some(raw) => Some(raw.parse::<IntakeMonth>()?),
        };

        let deadline_date = match self.deadline_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                lenient::parse_datetime(raw)
                    .ok_or_else(|| "Valid deadline date is required".to_string())?,
            ),
        };

        let status = self.status.as_deref().map(parse_status).transpose()?;

        if status == Some(IntakeStatus::Open) && deadline_date.unwrap_or(stored_deadline) < now {
            return Err("Cannot set status to open for a past deadline".to_string());
        }

        Ok(IntakeChanges {
            college_id: self.college,
            intake_month,
            intake_year: self.intake_year,
            deadline_date,
            status,
            visible: self.visible,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeDetail {
    #[serde(flatten)]
    pub intake: Intake,
    pub college: Option<College>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_create_defaults() {
        let req = IntakeRequest {
            college: Some(4),
            intake_month: Some("september".into()),
            intake_year: Some(2026),
            deadline_date: Some("2026-07-31".into()),
            ..Default::default()
        };
        let valid = req.validate_new(now()).unwrap();
        assert_eq!(valid.intake_month, IntakeMonth::September);
        assert_eq!(valid.status, IntakeStatus::Open);
        assert!(valid.visible);
    }

    #[test]
    fn test_create_collects_every_error() {
        let req = IntakeRequest {
            intake_month: Some("Smarch".into()),
            intake_year: Some(2020),
            deadline_date: Some("soon".into()),
            status: Some("paused".into()),
            ..Default::default()
        };
        let errors = req.validate_new(now()).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().any(|e| e == "Intake year cannot be in the past"));
    }

    #[test]
    fn test_reopen_past_deadline_rejected() {
        let past = now() - Duration::days(2);
        let req = IntakeRequest {
            status: Some("open".into()),
            ..Default::default()
        };
        assert_eq!(
            req.validate_changes(past, now()).unwrap_err(),
            "Cannot set status to open for a past deadline"
        );

        let req = IntakeRequest {
            status: Some("open".into()),
            deadline_date: Some("2026-12-01".into()),
            ..Default::default()
        };
        let changes = req.validate_changes(past, now()).unwrap();
        assert_eq!(changes.status, Some(IntakeStatus::Open));
    }
}
