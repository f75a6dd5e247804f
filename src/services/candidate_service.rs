use crate::entities::{
    CandidateStatus, EducationDetails, candidate_entity as candidates,
    country_entity as countries, job_entity as jobs, package_entity as packages,
};
use crate::error::{AppError, AppResult};
use crate::external::{DEFAULT_CANDIDATE_IMAGE, FileStorage, Mailer, UploadedFile};
use crate::models::{
    CandidateAuthResponse, CandidateDetail, CandidateRegistered, CandidateRequest,
    CandidateResponse, LoginRequest, PaginatedResponse, PaginationParams, ResetPasswordRequest,
};
use crate::services::listing::{fetch_list, trimmed};
use crate::utils::sequence::{candidate_sequence_key, format_candidate_id, next_sequence_value};
use crate::utils::{
    JwtService, TokenRole, derive_password_from_dob, generate_six_digit_code, hash_password,
    normalize_email, otp_expiry_from, otp_is_valid, require, validate_email, validate_mobile,
    verify_password,
};
use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

const IMAGE_FOLDER: &str = "candidates";

pub struct CandidateService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    mailer: Mailer,
    storage: Arc<dyn FileStorage>,
}

impl CandidateService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        mailer: Mailer,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            mailer,
            storage,
        }
    }

    async fn find_live(&self, id: i64) -> AppResult<candidates::Model> {
        candidates::Entity::find_by_id(id)
            .filter(candidates::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<candidates::Model> {
        candidates::Entity::find()
            .filter(candidates::Column::Email.eq(normalize_email(email)))
            .filter(candidates::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))
    }

    pub async fn find_active(&self, id: i64) -> AppResult<candidates::Model> {
        let candidate = candidates::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| AppError::AuthError("Candidate no longer exists".to_string()))?;
        if candidate.status == CandidateStatus::Blocked {
            return Err(AppError::AuthError("Account is blocked".to_string()));
        }
        Ok(candidate)
    }

    async fn ensure_unique(&self, email: Option<&str>, mobile: Option<&str>, except: Option<i64>) -> AppResult<()> {
        if email.is_none() && mobile.is_none() {
            return Ok(());
        }
        let mut clash = Condition::any();
        if let Some(email) = email {
            clash = clash.add(candidates::Column::Email.eq(email));
        }
        if let Some(mobile) = mobile {
            clash = clash.add(candidates::Column::Mobile.eq(mobile));
        }
        let mut query = candidates::Entity::find().filter(clash);
        if let Some(id) = except {
            query = query.filter(candidates::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Duplicate(
                "Candidate already exists with this email or mobile".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn register(
        &self,
        req: CandidateRequest,
        image: Option<UploadedFile>,
    ) -> AppResult<CandidateRegistered> {
        let email = normalize_email(require(req.email.as_deref(), "email")?);
        let mobile = require(req.mobile.as_deref(), "mobile")?.to_string();
        let dob = require(req.dob.as_deref(), "dob")?.to_string();
        let country_id = req
            .country
            .ok_or_else(|| AppError::ValidationError("country is required".to_string()))?;
        validate_mobile(&mobile)?;
        validate_email(&email)?;

        // 未传密码时用出生日期生成
        let password = match req.password.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => derive_password_from_dob(&dob)?,
        };
        if let Some(file) = &image {
            file.validate_image()?;
        }

        self.ensure_unique(Some(&email), Some(&mobile), None).await?;

        let year = Utc::now().year();
        let seq = next_sequence_value(&self.pool, &candidate_sequence_key(year)).await?;
        let can_id = format_candidate_id(year, seq);

        let stored = match &image {
            Some(file) => Some(self.storage.store(IMAGE_FOLDER, file).await?),
            None => None,
        };

        let now = Utc::now();
        let model = candidates::ActiveModel {
            can_id: Set(can_id),
            email: Set(email),
            mobile: Set(mobile),
            password: Set(hash_password(&password)?),
            first_name: Set(trimmed(req.first_name)),
            last_name: Set(trimmed(req.last_name)),
            gender: Set(req.gender),
            dob: Set(dob),
            image: Set(stored
                .as_ref()
                .map(|s| s.url.clone())
                .unwrap_or_else(|| DEFAULT_CANDIDATE_IMAGE.to_string())),
            image_public_id: Set(stored.map(|s| s.asset_id)),
            identity_type: Set(req.identity_type),
            identity_number: Set(trimmed(req.identity_number)),
            address_line1: Set(trimmed(req.address_line1)),
            address_line2: Set(trimmed(req.address_line2)),
            landmark: Set(trimmed(req.landmark)),
            city: Set(trimmed(req.city)),
            district: Set(trimmed(req.district)),
            state: Set(trimmed(req.state)),
            zip_code: Set(trimmed(req.zip_code)),
            country_id: Set(country_id),
            guardian_name: Set(trimmed(req.guardian_name)),
            guardian_relation: Set(req.guardian_relation),
            guardian_mobile: Set(trimmed(req.guardian_mobile)),
            guardian_occupation: Set(trimmed(req.guardian_occupation)),
            education_details: Set(EducationDetails(req.education_details.unwrap_or_default())),
            highest_qualification: Set(trimmed(req.highest_qualification)),
            university: Set(trimmed(req.university)),
            passing_year: Set(trimmed(req.passing_year)),
            preferred_job_id: Set(req.preferred_job),
            package_id: Set(req.package_id),
            status: Set(CandidateStatus::Active),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Registered candidate {} ({})", model.can_id, model.id);
        let full_name = model.full_name();
        if let Err(e) = self
            .mailer
            .send_welcome_candidate(&model.email, &full_name, &password)
            .await
        {
            log::error!("Failed to send welcome email to {}: {}", model.email, e);
        }

        Ok(CandidateRegistered {
            id: model.id,
            can_id: model.can_id,
            email: model.email,
            full_name,
        })
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<CandidateAuthResponse> {
        let email = normalize_email(require(req.email.as_deref(), "email")?);
        let password = require(req.password.as_deref(), "password")?;

        let invalid = || AppError::AuthError("Invalid credentials".to_string());
        let candidate = candidates::Entity::find()
            .filter(candidates::Column::Email.eq(email))
            .filter(candidates::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &candidate.password)? {
            return Err(invalid());
        }
        if candidate.status == CandidateStatus::Blocked {
            return Err(AppError::Forbidden);
        }

        let mut am = candidate.into_active_model();
        am.last_login = Set(Some(Utc::now()));
        let candidate = am.update(&self.pool).await?;

        let token = self
            .jwt_service
            .generate_access_token(candidate.id, TokenRole::Candidate)?;
        Ok(CandidateAuthResponse {
            token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            candidate: candidate.into(),
        })
    }

    pub async fn send_otp(&self, email: Option<&str>) -> AppResult<()> {
        let candidate = self.find_by_email(require(email, "email")?).await?;
        let code = generate_six_digit_code();

        let mut am = candidate.clone().into_active_model();
        am.otp = Set(Some(code.clone()));
        am.otp_expires = Set(Some(otp_expiry_from(Utc::now())));
        am.update(&self.pool).await?;

        if let Err(e) = self
            .mailer
            .send_otp(&candidate.email, &candidate.full_name(), &code)
            .await
        {
            log::error!("Failed to send OTP email to {}: {}", candidate.email, e);
        }
        Ok(())
    }

    pub async fn verify_otp(&self, email: Option<&str>, otp: Option<&str>) -> AppResult<()> {
        let candidate = self.find_by_email(require(email, "email")?).await?;
        let otp = require(otp, "otp")?;

        if !otp_is_valid(candidate.otp.as_deref(), candidate.otp_expires, otp, Utc::now()) {
            return Err(AppError::ValidationError("Invalid or expired OTP".to_string()));
        }

        let mut am = candidate.into_active_model();
        am.otp = Set(None);
        am.otp_expires = Set(None);
        am.update(&self.pool).await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: Option<&str>) -> AppResult<()> {
        let candidate = self.find_by_email(require(email, "email")?).await?;
        let code = generate_six_digit_code();

        let mut am = candidate.clone().into_active_model();
        am.reset_otp = Set(Some(code.clone()));
        am.reset_otp_expires = Set(Some(otp_expiry_from(Utc::now())));
        am.update(&self.pool).await?;

        if let Err(e) = self
            .mailer
            .send_otp(&candidate.email, &candidate.full_name(), &code)
            .await
        {
            log::error!("Failed to send password reset OTP to {}: {}", candidate.email, e);
        }
        Ok(())
    }

    pub async fn reset_password(&self, req: ResetPasswordRequest) -> AppResult<()> {
        let candidate = self
            .find_by_email(require(req.email.as_deref(), "email")?)
            .await?;
        let otp = require(req.otp.as_deref(), "otp")?;
        let new_password = require(req.new_password.as_deref(), "newPassword")?;

        if !otp_is_valid(
            candidate.reset_otp.as_deref(),
            candidate.reset_otp_expires,
            otp,
            Utc::now(),
        ) {
            return Err(AppError::ValidationError("Invalid or expired OTP".to_string()));
        }

        let mut am = candidate.into_active_model();
        am.password = Set(hash_password(new_password)?);
        am.reset_otp = Set(None);
        am.reset_otp_expires = Set(None);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        Ok(())
    }

    /// 带引用信息的详情
    pub async fn detail(&self, id: i64) -> AppResult<CandidateDetail> {
        let candidate = self.find_live(id).await?;

        let country = countries::Entity::find_by_id(candidate.country_id)
            .one(&self.pool)
            .await?;
        let preferred_job = match candidate.preferred_job_id {
            Some(job_id) => jobs::Entity::find_by_id(job_id).one(&self.pool).await?,
            None => None,
        };
        let package = match candidate.package_id {
            Some(package_id) => packages::Entity::find_by_id(package_id).one(&self.pool).await?,
            None => None,
        };

        Ok(CandidateDetail {
            candidate: candidate.into(),
            country,
            preferred_job,
            package,
        })
    }

    pub async fn update(
        &self,
        id: i64,
        req: CandidateRequest,
        image: Option<UploadedFile>,
    ) -> AppResult<CandidateResponse> {
        let candidate = self.find_live(id).await?;

        let email = req.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            validate_email(email)?;
        }
        let mobile = req.mobile.as_deref().map(|m| m.trim().to_string());
        if let Some(mobile) = &mobile {
            validate_mobile(mobile)?;
        }
        self.ensure_unique(email.as_deref(), mobile.as_deref(), Some(id))
            .await?;

        let old_asset = candidate.image_public_id.clone();
        let mut am = candidate.into_active_model();
        if let Some(v) = email {
            am.email = Set(v);
        }
        if let Some(v) = mobile {
            am.mobile = Set(v);
        }
        if let Some(v) = req.password.filter(|p| !p.trim().is_empty()) {
            am.password = Set(hash_password(&v)?);
        }
        if let Some(v) = req.first_name {
            am.first_name = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.last_name {
            am.last_name = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.gender {
            am.gender = Set(Some(v));
        }
        if let Some(v) = req.dob {
            am.dob = Set(v.trim().to_string());
        }
        if let Some(v) = req.identity_type {
            am.identity_type = Set(Some(v));
        }
        if let Some(v) = req.identity_number {
            am.identity_number = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.address_line1 {
            am.address_line1 = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.address_line2 {
            am.address_line2 = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.landmark {
            am.landmark = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.city {
            am.city = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.district {
            am.district = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.state {
            am.state = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.zip_code {
            am.zip_code = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.country {
            am.country_id = Set(v);
        }
        if let Some(v) = req.guardian_name {
            am.guardian_name = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.guardian_relation {
            am.guardian_relation = Set(Some(v));
        }
        if let Some(v) = req.guardian_mobile {
            am.guardian_mobile = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.guardian_occupation {
            am.guardian_occupation = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.education_details {
            am.education_details = Set(EducationDetails(v));
        }
        if let Some(v) = req.highest_qualification {
            am.highest_qualification = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.university {
            am.university = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.passing_year {
            am.passing_year = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.preferred_job {
            am.preferred_job_id = Set(Some(v));
        }
        if let Some(v) = req.package_id {
            am.package_id = Set(Some(v));
        }

        let mut replaced = false;
        if let Some(file) = &image {
            file.validate_image()?;
            let stored = self.storage.store(IMAGE_FOLDER, file).await?;
            am.image = Set(stored.url);
            am.image_public_id = Set(Some(stored.asset_id));
            replaced = true;
        }
        am.updated_at = Set(Utc::now());
        let candidate = am.update(&self.pool).await?;

        if replaced {
            self.storage.discard(old_asset.as_deref()).await;
        }
        Ok(candidate.into())
    }

    pub async fn soft_delete(&self, id: i64) -> AppResult<()> {
        let candidate = self.find_live(id).await?;
        let mut am = candidate.into_active_model();
        am.is_deleted = Set(true);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        log::info!("Candidate {} soft deleted", id);
        Ok(())
    }

    pub async fn set_status(&self, id: i64, status: CandidateStatus) -> AppResult<CandidateResponse> {
        let candidate = self.find_live(id).await?;
        let mut am = candidate.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn list(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CandidateResponse>> {
        let select = candidates::Entity::find()
            .filter(candidates::Column::IsDeleted.eq(false))
            .order_by_desc(candidates::Column::CreatedAt);
        Ok(fetch_list(&self.pool, select, params, None)
            .await?
            .map(CandidateResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::external::LocalDiskStorage;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn candidate(id: i64, can_id: &str) -> candidates::Model {
        let now = Utc::now();
        candidates::Model {
            id,
            can_id: can_id.into(),
            email: "ravi@example.com".into(),
            mobile: "9876543210".into(),
            password: "hash".into(),
            otp: None,
            otp_expires: None,
            reset_otp: None,
            reset_otp_expires: None,
            first_name: Some("Ravi".into()),
            last_name: Some("Kumar".into()),
            gender: None,
            dob: "05/07/2001".into(),
            image: DEFAULT_CANDIDATE_IMAGE.into(),
            image_public_id: None,
            identity_type: None,
            identity_number: None,
            address_line1: None,
            address_line2: None,
            landmark: None,
            city: None,
            district: None,
            state: None,
            zip_code: None,
            country_id: 1,
            guardian_name: None,
            guardian_relation: None,
            guardian_mobile: None,
            guardian_occupation: None,
            education_details: EducationDetails::default(),
            highest_qualification: None,
            university: None,
            passing_year: None,
            preferred_job_id: None,
            package_id: None,
            status: CandidateStatus::Active,
            is_deleted: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: DatabaseConnection) -> CandidateService {
        CandidateService::new(
            db,
            JwtService::new("test-secret", 3600),
            Mailer::disabled("Edu Consult"),
            Arc::new(LocalDiskStorage::new(&StorageConfig::default())),
        )
    }

    fn request() -> CandidateRequest {
        CandidateRequest {
            email: Some("Ravi@Example.com".into()),
            mobile: Some("9876543210".into()),
            dob: Some("5-7-2001".into()),
            country: Some(1),
            first_name: Some("Ravi".into()),
            last_name: Some("Kumar".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_assigns_sequential_id() {
        let year = Utc::now().year();
        let expected = format_candidate_id(year, 7);
        let seq_row = BTreeMap::from([("value", Value::BigInt(Some(7)))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<candidates::Model>::new()])
            .append_query_results([vec![seq_row]])
            .append_query_results([vec![candidate(11, &expected)]])
            .into_connection();
        let svc = service(db);

        let registered = svc.register(request(), None).await.unwrap();
        assert_eq!(registered.can_id, expected);
        assert_eq!(registered.full_name, "Ravi Kumar");
        assert_eq!(svc.pool.into_transaction_log().len(), 3);
    }

    #[tokio::test]
    async fn test_register_duplicate_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![candidate(3, "CAN2026003")]])
            .into_connection();
        let svc = service(db);

        let err = svc.register(request(), None).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
        // 只有查重一条语句，不会分配编号
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input_before_touching_db() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);

        let bad_dob = CandidateRequest {
            dob: Some("2001.07.05".into()),
            ..request()
        };
        let err = svc.register(bad_dob, None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m.starts_with("Invalid DOB format")));

        let bad_mobile = CandidateRequest {
            mobile: Some("12345".into()),
            ..request()
        };
        let err = svc.register(bad_mobile, None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "Mobile number must be 8 to 10 digits"));

        let no_country = CandidateRequest {
            country: None,
            ..request()
        };
        assert!(svc.register(no_country, None).await.is_err());

        assert!(svc.pool.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_candidate_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<candidates::Model>::new()])
            .into_connection();
        let svc = service(db);
        assert!(matches!(svc.detail(4).await, Err(AppError::NotFound(_))));
    }
}
