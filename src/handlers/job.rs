use crate::middlewares::CurrentStaff;
use crate::models::*;
use crate::services::{CertificateService, JobService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/jobs",
    tag = "job",
    request_body = JobRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "职位已创建"),
        (status = 400, description = "请求参数错误或职位重复")
    )
)]
pub async fn create_job(
    job_service: web::Data<JobService>,
    staff: CurrentStaff,
    request: web::Json<JobRequest>,
) -> Result<HttpResponse> {
    match job_service.create(request.into_inner(), staff.0.id).await {
        Ok(job) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            job,
            "Job created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/jobs",
    tag = "job",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "在招职位列表"))
)]
pub async fn list_jobs(
    job_service: web::Data<JobService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match job_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/jobs/count",
    tag = "job",
    responses((status = 200, description = "在招职位数量", body = CountResponse))
)]
pub async fn count_jobs(job_service: web::Data<JobService>) -> Result<HttpResponse> {
    match job_service.count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = "job",
    params(("id" = i64, Path, description = "职位 ID")),
    responses(
        (status = 200, description = "职位详情"),
        (status = 404, description = "职位不存在")
    )
)]
pub async fn get_job(
    job_service: web::Data<JobService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match job_service.get(path.into_inner()).await {
        Ok(job) => Ok(HttpResponse::Ok().json(ApiResponse::success(job))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/jobs/{id}",
    tag = "job",
    params(("id" = i64, Path, description = "职位 ID")),
    request_body = JobRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "职位已更新"),
        (status = 404, description = "职位不存在")
    )
)]
pub async fn update_job(
    job_service: web::Data<JobService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
    request: web::Json<JobRequest>,
) -> Result<HttpResponse> {
    match job_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(job) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            job,
            "Job updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    tag = "job",
    params(("id" = i64, Path, description = "职位 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "职位已下线"),
        (status = 404, description = "职位不存在")
    )
)]
pub async fn delete_job(
    job_service: web::Data<JobService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match job_service.deactivate(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Job deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/certificates",
    tag = "certificate",
    request_body = CertificateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "证书已创建"),
        (status = 400, description = "请求参数错误或编号重复")
    )
)]
pub async fn create_certificate(
    certificate_service: web::Data<CertificateService>,
    _staff: CurrentStaff,
    request: web::Json<CertificateRequest>,
) -> Result<HttpResponse> {
    match certificate_service.create(request.into_inner()).await {
        Ok(certificate) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            certificate,
            "Certificate created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/certificates",
    tag = "certificate",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "证书列表"))
)]
pub async fn list_certificates(
    certificate_service: web::Data<CertificateService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match certificate_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/certificates/count",
    tag = "certificate",
    responses((status = 200, description = "证书数量", body = CountResponse))
)]
pub async fn count_certificates(
    certificate_service: web::Data<CertificateService>,
) -> Result<HttpResponse> {
    match certificate_service.count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/certificates/{id}",
    tag = "certificate",
    params(("id" = i64, Path, description = "证书 ID")),
    responses(
        (status = 200, description = "证书详情"),
        (status = 404, description = "证书不存在")
    )
)]
pub async fn get_certificate(
    certificate_service: web::Data<CertificateService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match certificate_service.get(path.into_inner()).await {
        Ok(certificate) => Ok(HttpResponse::Ok().json(ApiResponse::success(certificate))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/certificates/{id}",
    tag = "certificate",
    params(("id" = i64, Path, description = "证书 ID")),
    request_body = CertificateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "证书已更新"),
        (status = 404, description = "证书不存在")
    )
)]
pub async fn update_certificate(
    certificate_service: web::Data<CertificateService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
    request: web::Json<CertificateRequest>,
) -> Result<HttpResponse> {
    match certificate_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(certificate) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            certificate,
            "Certificate updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/certificates/{id}",
    tag = "certificate",
    params(("id" = i64, Path, description = "证书 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "证书已删除"),
        (status = 404, description = "证书不存在")
    )
)]
pub async fn delete_certificate(
    certificate_service: web::Data<CertificateService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match certificate_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Certificate deleted successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn job_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/jobs")
            .route("", web::post().to(create_job))
            .route("", web::get().to(list_jobs))
            .route("/count", web::get().to(count_jobs))
            .route("/{id}", web::get().to(get_job))
            .route("/{id}", web::put().to(update_job))
            .route("/{id}", web::delete().to(delete_job)),
    );
}

pub fn certificate_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/certificates")
            .route("", web::post().to(create_certificate))
            .route("", web::get().to(list_certificates))
            .route("/count", web::get().to(count_certificates))
            .route("/{id}", web::get().to(get_certificate))
            .route("/{id}", web::put().to(update_certificate))
            .route("/{id}", web::delete().to(delete_certificate)),
    );
}
