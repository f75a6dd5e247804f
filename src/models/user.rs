use crate::entities::{UserStatus, UserType, user_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[schema(example = "Asha")]
    pub fname: Option<String>,
    #[schema(example = "Verma")]
    pub lname: Option<String>,
    #[schema(example = "asha@example.com")]
    pub email: Option<String>,
    #[schema(example = "9876543210")]
    pub mobile: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<UserType>,
    pub status: Option<UserStatus>,
    pub country: Option<String>,
    #[serde(alias = "curncyCode")]
    pub currency_code: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
    pub country: Option<String>,
    #[serde(alias = "curncyCode")]
    pub currency_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "asha@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailRequest {
    #[schema(example = "asha@example.com")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    #[schema(example = "482913")]
    pub otp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub image: String,
    pub user_type: UserType,
    pub status: UserStatus,
    pub country: Option<String>,
    pub currency_code: Option<String>,
    pub is_deleted: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(user: user_entity::Model) -> Self {
        Self {
            full_name: user.full_name(),
            id: user.id,
            fname: user.fname,
            lname: user.lname,
            email: user.email,
            mobile: user.mobile,
            image: user.image,
            user_type: user.user_type,
            status: user.status,
            country: user.country,
            currency_code: user.currency_code,
            is_deleted: user.is_deleted,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}
