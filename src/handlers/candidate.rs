use crate::entities::CandidateStatus;
use crate::middlewares::{AdminUser, CurrentCandidate, UploadForm};
use crate::models::*;
use crate::services::CandidateService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/candidate/register",
    tag = "candidate",
    request_body = CandidateRequest,
    responses(
        (status = 201, description = "注册成功", body = CandidateRegistered),
        (status = 400, description = "请求参数错误或候选人已存在")
    )
)]
pub async fn register(
    candidate_service: web::Data<CandidateService>,
    form: UploadForm<CandidateRequest>,
) -> Result<HttpResponse> {
    match candidate_service.register(form.data, form.image).await {
        Ok(registered) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            registered,
            "Candidate registered successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/candidate/login",
    tag = "candidate",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = CandidateAuthResponse),
        (status = 401, description = "邮箱或密码错误")
    )
)]
pub async fn login(
    candidate_service: web::Data<CandidateService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match candidate_service.login(request.into_inner()).await {
        Ok(auth) => Ok(HttpResponse::Ok().json(ApiResponse::success(auth))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/candidate/send-otp",
    tag = "candidate",
    request_body = EmailRequest,
    responses((status = 200, description = "验证码已发送"))
)]
pub async fn send_otp(
    candidate_service: web::Data<CandidateService>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse> {
    match candidate_service.send_otp(request.email.as_deref()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("OTP sent successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/candidate/verify-otp",
    tag = "candidate",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "验证成功"),
        (status = 400, description = "验证码无效或已过期")
    )
)]
pub async fn verify_otp(
    candidate_service: web::Data<CandidateService>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    match candidate_service
        .verify_otp(request.email.as_deref(), request.otp.as_deref())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("OTP verified successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/candidate/forgot-password",
    tag = "candidate",
    request_body = EmailRequest,
    responses((status = 200, description = "重置验证码已发送"))
)]
pub async fn forgot_password(
    candidate_service: web::Data<CandidateService>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse> {
    match candidate_service
        .forgot_password(request.email.as_deref())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Password reset OTP sent to your email",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/candidate/reset-password",
    tag = "candidate",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "密码已重置"),
        (status = 400, description = "验证码无效或已过期")
    )
)]
pub async fn reset_password(
    candidate_service: web::Data<CandidateService>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    match candidate_service.reset_password(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Password reset successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/candidate/me",
    tag = "candidate",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前候选人"),
        (status = 401, description = "未授权")
    )
)]
pub async fn current(
    candidate_service: web::Data<CandidateService>,
    candidate: CurrentCandidate,
) -> Result<HttpResponse> {
    match candidate_service.detail(candidate.0.id).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/candidate/update",
    tag = "candidate",
    request_body = CandidateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = CandidateResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn update(
    candidate_service: web::Data<CandidateService>,
    candidate: CurrentCandidate,
    form: UploadForm<CandidateRequest>,
) -> Result<HttpResponse> {
    match candidate_service
        .update(candidate.0.id, form.data, form.image)
        .await
    {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            updated,
            "Candidate updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/candidate/{id}",
    tag = "candidate",
    params(("id" = i64, Path, description = "候选人 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已删除"),
        (status = 403, description = "需要管理员身份"),
        (status = 404, description = "候选人不存在")
    )
)]
pub async fn delete(
    candidate_service: web::Data<CandidateService>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match candidate_service.soft_delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Candidate deleted successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/candidate/block/{id}",
    tag = "candidate",
    params(("id" = i64, Path, description = "候选人 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses((status = 200, description = "已封禁", body = CandidateResponse))
)]
pub async fn block(
    candidate_service: web::Data<CandidateService>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match candidate_service
        .set_status(path.into_inner(), CandidateStatus::Blocked)
        .await
    {
        Ok(candidate) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            candidate,
            "Candidate blocked successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/candidate/reactivate/{id}",
    tag = "candidate",
    params(("id" = i64, Path, description = "候选人 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses((status = 200, description = "已恢复", body = CandidateResponse))
)]
pub async fn reactivate(
    candidate_service: web::Data<CandidateService>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match candidate_service
        .set_status(path.into_inner(), CandidateStatus::Active)
        .await
    {
        Ok(candidate) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            candidate,
            "Candidate reactivated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/candidate",
    tag = "candidate",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "候选人列表"),
        (status = 403, description = "需要管理员身份")
    )
)]
pub async fn list(
    candidate_service: web::Data<CandidateService>,
    _admin: AdminUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match candidate_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/candidate/{id}",
    tag = "candidate",
    params(("id" = i64, Path, description = "候选人 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "候选人详情"),
        (status = 404, description = "候选人不存在")
    )
)]
pub async fn get(
    candidate_service: web::Data<CandidateService>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match candidate_service.detail(path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn candidate_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/candidate")
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
