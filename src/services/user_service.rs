use crate::config::SeedConfig;
use crate::entities::{UserStatus, UserType, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::external::{DEFAULT_USER_IMAGE, FileStorage, Mailer, UploadedFile};
use crate::models::{
    LoginRequest, PaginatedResponse, PaginationParams, RegisterUserRequest, ResetPasswordRequest,
    UpdateUserRequest, UserAuthResponse, UserResponse,
};
use crate::services::listing::{fetch_list, trimmed};
use crate::utils::{
    JwtService, TokenRole, generate_six_digit_code, hash_password, normalize_email,
    otp_expiry_from, otp_is_valid, require, validate_email, verify_password,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

const IMAGE_FOLDER: &str = "users";

/// 员工账号 (admin / licensee)
pub struct UserService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    mailer: Mailer,
    storage: Arc<dyn FileStorage>,
}

fn token_role(user_type: UserType) -> TokenRole {
    match user_type {
        UserType::Admin => TokenRole::Admin,
        UserType::Licensee => TokenRole::Licensee,
    }
}

impl UserService {
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

    async fn find_live(&self, id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(id)
            .filter(users::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<users::Model> {
        users::Entity::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .filter(users::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Used by the request guards; blocked and deleted accounts do not authenticate.
    pub async fn find_active(&self, id: i64) -> AppResult<users::Model> {
        let user = users::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;
        if user.status == UserStatus::Blocked {
            return Err(AppError::AuthError("Account is blocked".to_string()));
        }
        Ok(user)
    }

    pub async fn register(
        &self,
        req: RegisterUserRequest,
        image: Option<UploadedFile>,
        caller: Option<&users::Model>,
    ) -> AppResult<UserResponse> {
        let email = normalize_email(require(req.email.as_deref(), "email")?);
        let mobile = require(req.mobile.as_deref(), "mobile")?.to_string();
        let password = require(req.password.as_deref(), "password")?.to_string();
        let user_type = req
            .user_type
            .ok_or_else(|| AppError::ValidationError("userType is required".to_string()))?;
        validate_email(&email)?;

        // 只有管理员才能创建管理员
        if user_type == UserType::Admin && !caller.is_some_and(|c| c.is_admin()) {
            log::warn!("Rejected admin registration for {} without admin caller", email);
            return Err(AppError::Forbidden);
        }

        let existing = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(email.clone()))
                    .add(users::Column::Mobile.eq(mobile.clone())),
            )
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Duplicate(
                "User already exists with this email or mobile".to_string(),
            ));
        }

        if let Some(file) = &image {
            file.validate_image()?;
        }
        let stored = match &image {
            Some(file) => Some(self.storage.store(IMAGE_FOLDER, file).await?),
            None => None,
        };

        let now = Utc::now();
        let model = users::ActiveModel {
            fname: Set(trimmed(req.fname)),
            lname: Set(trimmed(req.lname)),
            email: Set(email),
            mobile: Set(mobile),
            password: Set(hash_password(&password)?),
            image: Set(stored
                .as_ref()
                .map(|s| s.url.clone())
                .unwrap_or_else(|| DEFAULT_USER_IMAGE.to_string())),
            image_public_id: Set(stored.map(|s| s.asset_id)),
            user_type: Set(user_type),
            status: Set(req.status.unwrap_or(UserStatus::New)),
            country: Set(trimmed(req.country)),
            currency_code: Set(trimmed(req.currency_code)),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Registered {:?} user {}", model.user_type, model.id);
        if let Err(e) = self.mailer.send_welcome(&model.email, &model.full_name()).await {
            log::error!("Failed to send welcome email to {}: {}", model.email, e);
        }
        Ok(model.into())
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<UserAuthResponse> {
        let email = normalize_email(require(req.email.as_deref(), "email")?);
        let password = require(req.password.as_deref(), "password")?;

        let invalid = || AppError::AuthError("Invalid credentials".to_string());
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password)? {
            return Err(invalid());
        }
        if user.status == UserStatus::Blocked {
            return Err(AppError::Forbidden);
        }

        let role = token_role(user.user_type);
        let mut am = user.into_active_model();
        am.last_login = Set(Some(Utc::now()));
        let user = am.update(&self.pool).await?;

        let token = self.jwt_service.generate_access_token(user.id, role)?;
        Ok(UserAuthResponse {
            token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: user.into(),
        })
    }

    pub async fn send_otp(&self, email: Option<&str>) -> AppResult<()> {
        let user = self.find_by_email(require(email, "email")?).await?;
        let code = generate_six_digit_code();

        let mut am = user.clone().into_active_model();
        am.otp = Set(Some(code.clone()));
        am.otp_expires = Set(Some(otp_expiry_from(Utc::now())));
        am.update(&self.pool).await?;

        if let Err(e) = self.mailer.send_otp(&user.email, &user.full_name(), &code).await {
            log::error!("Failed to send OTP email to {}: {}", user.email, e);
        }
        Ok(())
    }

    pub async fn verify_otp(&self, email: Option<&str>, otp: Option<&str>) -> AppResult<()> {
        let user = self.find_by_email(require(email, "email")?).await?;
        let otp = require(otp, "otp")?;

        if !otp_is_valid(user.otp.as_deref(), user.otp_expires, otp, Utc::now()) {
            return Err(AppError::ValidationError("Invalid or expired OTP".to_string()));
        }

        let mut am = user.into_active_model();
        am.otp = Set(None);
        am.otp_expires = Set(None);
        am.update(&self.pool).await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: Option<&str>) -> AppResult<()> {
        let user = self.find_by_email(require(email, "email")?).await?;
        let code = generate_six_digit_code();

        let mut am = user.clone().into_active_model();
        am.reset_otp = Set(Some(code.clone()));
        am.reset_otp_expires = Set(Some(otp_expiry_from(Utc::now())));
        am.update(&self.pool).await?;

        if let Err(e) = self.mailer.send_otp(&user.email, &user.full_name(), &code).await {
            log::error!("Failed to send password reset OTP to {}: {}", user.email, e);
        }
        Ok(())
    }

    pub async fn reset_password(&self, req: ResetPasswordRequest) -> AppResult<()> {
        let user = self.find_by_email(require(req.email.as_deref(), "email")?).await?;
        let otp = require(req.otp.as_deref(), "otp")?;
        let new_password = require(req.new_password.as_deref(), "newPassword")?;

        if !otp_is_valid(
            user.reset_otp.as_deref(),
            user.reset_otp_expires,
            otp,
            Utc::now(),
        ) {
            return Err(AppError::ValidationError("Invalid or expired OTP".to_string()));
        }

        let mut am = user.into_active_model();
        am.password = Set(hash_password(new_password)?);
        am.reset_otp = Set(None);
        am.reset_otp_expires = Set(None);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        Ok(())
    }

    pub async fn get(&self, id: i64) -> AppResult<UserResponse> {
        Ok(self.find_live(id).await?.into())
    }

    pub async fn update(
        &self,
        id: i64,
        req: UpdateUserRequest,
        image: Option<UploadedFile>,
    ) -> AppResult<UserResponse> {
        let user = self.find_live(id).await?;

        let email = req.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            validate_email(email)?;
        }
        let mut clash = Condition::any();
        if let Some(email) = &email {
            clash = clash.add(users::Column::Email.eq(email.clone()));
        }
        if let Some(mobile) = &req.mobile {
            clash = clash.add(users::Column::Mobile.eq(mobile.trim()));
        }
        if email.is_some() || req.mobile.is_some() {
            let taken = users::Entity::find()
                .filter(clash)
                .filter(users::Column::Id.ne(id))
                .one(&self.pool)
                .await?;
            if taken.is_some() {
                return Err(AppError::Duplicate(
                    "Email or mobile already in use".to_string(),
                ));
            }
        }

        let old_asset = user.image_public_id.clone();
        let mut am = user.into_active_model();
        if let Some(v) = req.fname {
            am.fname = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.lname {
            am.lname = Set(trimmed(Some(v)));
        }
        if let Some(v) = email {
            am.email = Set(v);
        }
        if let Some(v) = req.mobile {
            am.mobile = Set(v.trim().to_string());
        }
        if let Some(v) = req.password.filter(|p| !p.is_empty()) {
            am.password = Set(hash_password(&v)?);
        }
        if let Some(v) = req.country {
            am.country = Set(trimmed(Some(v)));
        }
        if let Some(v) = req.currency_code {
            am.currency_code = Set(trimmed(Some(v)));
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
        let user = am.update(&self.pool).await?;

        if replaced {
            self.storage.discard(old_asset.as_deref()).await;
        }
        Ok(user.into())
    }

    pub async fn soft_delete(&self, id: i64) -> AppResult<()> {
        let user = self.find_live(id).await?;
        let mut am = user.into_active_model();
        am.is_deleted = Set(true);
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;
        log::info!("User {} soft deleted", id);
        Ok(())
    }

    pub async fn set_status(&self, id: i64, status: UserStatus) -> AppResult<UserResponse> {
        let user = self.find_live(id).await?;
        let mut am = user.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<UserResponse>> {
        let select = users::Entity::find()
            .filter(users::Column::IsDeleted.eq(false))
            .order_by_desc(users::Column::CreatedAt);
        Ok(fetch_list(&self.pool, select, params, None)
            .await?
            .map(UserResponse::from))
    }

    /// 启动时写入默认管理员；同邮箱账号已存在（含已删除）则跳过
    pub async fn ensure_admin(&self, seed: &SeedConfig) -> AppResult<()> {
        let email = normalize_email(&seed.admin_email);
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.pool)
            .await?;
        if let Some(admin) = existing {
            log::info!("Admin user already exists {}", admin.email);
            return Ok(());
        }

        let now = Utc::now();
        let admin = users::ActiveModel {
            fname: Set(trimmed(Some(seed.admin_fname.clone()))),
            lname: Set(trimmed(Some(seed.admin_lname.clone()))),
            email: Set(email),
            mobile: Set(seed.admin_mobile.clone()),
            password: Set(hash_password(&seed.admin_password)?),
            image: Set(DEFAULT_USER_IMAGE.to_string()),
            image_public_id: Set(None),
            user_type: Set(UserType::Admin),
            status: Set(UserStatus::Active),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Default admin user {} created", admin.email);
        if let Err(e) = self.mailer.send_welcome(&admin.email, &admin.full_name()).await {
            log::error!("Failed to send welcome email to {}: {}", admin.email, e);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::external::LocalDiskStorage;
    use sea_orm::{DatabaseBackend, MockDatabase};

    pub(crate) fn user(id: i64, user_type: UserType) -> users::Model {
        let now = Utc::now();
        users::Model {
            id,
            fname: Some("Asha".into()),
            lname: Some("Verma".into()),
            email: format!("user{id}@example.com"),
            mobile: format!("98765432{id:02}"),
            password: hash_password("secret123").unwrap(),
            image: DEFAULT_USER_IMAGE.into(),
            image_public_id: None,
            user_type,
            status: UserStatus::Active,
            country: None,
            currency_code: None,
            is_deleted: false,
            last_login: None,
            otp: None,
            otp_expires: None,
            reset_otp: None,
            reset_otp_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: DatabaseConnection) -> UserService {
        UserService::new(
            db,
            JwtService::new("test-secret", 3600),
            Mailer::disabled("Edu Consult"),
            Arc::new(LocalDiskStorage::new(&StorageConfig::default())),
        )
    }

    fn register_request(user_type: UserType) -> RegisterUserRequest {
        RegisterUserRequest {
            fname: Some("Neha".into()),
            email: Some("Neha@Example.com".into()),
            mobile: Some("9123456780".into()),
            password: Some("pass1234".into()),
            user_type: Some(user_type),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, UserType::Licensee)]])
            .into_connection();
        let svc = service(db);

        let err = svc
            .register(register_request(UserType::Licensee), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));

        let log = svc.pool.into_transaction_log();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_registration_needs_admin_caller() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let licensee = user(2, UserType::Licensee);

        let err = svc
            .register(register_request(UserType::Admin), None, Some(&licensee))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = svc
            .register(register_request(UserType::Admin), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);
        let req = RegisterUserRequest {
            email: Some("a@example.com".into()),
            ..Default::default()
        };
        let err = svc.register(req, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "mobile is required"));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, UserType::Admin)]])
            .into_connection();
        let svc = service(db);
        let err = svc
            .login(LoginRequest {
                email: Some("user1@example.com".into()),
                password: Some("nope".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_login_issues_token_with_role() {
        let admin = user(1, UserType::Admin);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![admin.clone()], vec![admin]])
            .into_connection();
        let svc = service(db);
        let auth = svc
            .login(LoginRequest {
                email: Some("USER1@example.com".into()),
                password: Some("secret123".into()),
            })
            .await
            .unwrap();
        let claims = svc.jwt_service.verify_access_token(&auth.token).unwrap();
        assert_eq!(claims.role, TokenRole::Admin);
        assert_eq!(claims.subject_id().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_verify_otp_rejects_mismatch() {
        let mut u = user(3, UserType::Licensee);
        u.otp = Some("111111".into());
        u.otp_expires = Some(otp_expiry_from(Utc::now()));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![u]])
            .into_connection();
        let svc = service(db);
        let err = svc
            .verify_otp(Some("user3@example.com"), Some("222222"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "Invalid or expired OTP"));

        // 校验失败不写库
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_admin_skips_existing_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, UserType::Admin)]])
            .into_connection();
        let svc = service(db);
        svc.ensure_admin(&SeedConfig::default()).await.unwrap();
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_admin_inserts_active_admin() {
        let mut admin = user(1, UserType::Admin);
        admin.email = "admin@example.com".into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .append_query_results([vec![admin]])
            .into_connection();
        let svc = service(db);
        svc.ensure_admin(&SeedConfig::default()).await.unwrap();

        let log = svc.pool.into_transaction_log();
        assert_eq!(log.len(), 2);
        let insert = format!("{:?}", log[1]);
        assert!(insert.contains("INSERT"));
        assert!(insert.contains("admin@example.com"));
    }
}
