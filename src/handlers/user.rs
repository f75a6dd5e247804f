use crate::entities::UserStatus;
use crate::error::AppError;
use crate::middlewares::{AdminUser, CurrentStaff, MaybeStaff, UploadForm};
use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/users/register",
    tag = "user",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "注册成功", body = UserResponse),
        (status = 400, description = "请求参数错误或用户已存在"),
        (status = 403, description = "创建管理员需要管理员身份")
    )
)]
pub async fn register(
    user_service: web::Data<UserService>,
    caller: MaybeStaff,
    form: UploadForm<RegisterUserRequest>,
) -> Result<HttpResponse> {
    match user_service
        .register(form.data, form.image, caller.0.as_ref())
        .await
    {
        Ok(user) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            user,
            "User registered successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/login",
    tag = "user",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = UserAuthResponse),
        (status = 401, description = "邮箱或密码错误")
    )
)]
pub async fn login(
    user_service: web::Data<UserService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match user_service.login(request.into_inner()).await {
        Ok(auth) => Ok(HttpResponse::Ok().json(ApiResponse::success(auth))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/send-otp",
    tag = "user",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "验证码已发送"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn send_otp(
    user_service: web::Data<UserService>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse> {
    match user_service.send_otp(request.email.as_deref()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("OTP sent successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/verify-otp",
    tag = "user",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "验证成功"),
        (status = 400, description = "验证码无效或已过期")
    )
)]
pub async fn verify_otp(
    user_service: web::Data<UserService>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    match user_service
        .verify_otp(request.email.as_deref(), request.otp.as_deref())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("OTP verified successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/forgot-password",
    tag = "user",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "重置验证码已发送"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn forgot_password(
    user_service: web::Data<UserService>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse> {
    match user_service.forgot_password(request.email.as_deref()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Password reset OTP sent to your email",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/reset-password",
    tag = "user",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "密码已重置"),
        (status = 400, description = "验证码无效或已过期")
    )
)]
pub async fn reset_password(
    user_service: web::Data<UserService>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    match user_service.reset_password(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Password reset successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户", body = UserResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn current(staff: CurrentStaff) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(staff.0))))
}

#[utoipa::path(
    put,
    path = "/users/update",
    tag = "user",
    request_body = UpdateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = UserResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn update(
    user_service: web::Data<UserService>,
    staff: CurrentStaff,
    form: UploadForm<UpdateUserRequest>,
) -> Result<HttpResponse> {
    match user_service.update(staff.0.id, form.data, form.image).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            user,
            "User updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "user",
    params(("id" = i64, Path, description = "用户 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已删除"),
        (status = 403, description = "只能删除自己的账号"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn delete(
    user_service: web::Data<UserService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if staff.0.id != id && !staff.0.is_admin() {
        return Ok(AppError::Forbidden.error_response());
    }
    match user_service.soft_delete(id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/block/{id}",
    tag = "user",
    params(("id" = i64, Path, description = "用户 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已封禁", body = UserResponse),
        (status = 403, description = "需要管理员身份")
    )
)]
pub async fn block(
    user_service: web::Data<UserService>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match user_service
        .set_status(path.into_inner(), UserStatus::Blocked)
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            user,
            "User blocked successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/reactivate/{id}",
    tag = "user",
    params(("id" = i64, Path, description = "用户 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已恢复", body = UserResponse),
        (status = 403, description = "需要管理员身份")
    )
)]
pub async fn reactivate(
    user_service: web::Data<UserService>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match user_service
        .set_status(path.into_inner(), UserStatus::Active)
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            user,
            "User reactivated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户列表"),
        (status = 403, description = "需要管理员身份")
    )
)]
pub async fn list(
    user_service: web::Data<UserService>,
    _admin: AdminUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match user_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "user",
    params(("id" = i64, Path, description = "用户 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户详情", body = UserResponse),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn get(
    user_service: web::Data<UserService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if staff.0.id != id && !staff.0.is_admin() {
        return Ok(AppError::Forbidden.error_response());
    }
    match user_service.get(id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/send-otp", web::post().to(send_otp))
            .route("/verify-otp", web::post().to(verify_otp))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password", web::post().to(reset_password))
            .route("/me", web::get().to(current))
            .route("/update", web::put().to(update))
            .route("/block/{id}", web::put().to(block))
            .route("/reactivate/{id}", web::put().to(reactivate))
            .route("", web::get().to(list))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::delete().to(delete)),
    );
}
