use crate::middlewares::CurrentStaff;
use crate::models::*;
use crate::services::IntakeService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/intake",
    tag = "intake",
    request_body = IntakeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "招生批次已创建"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_intake(
    intake_service: web::Data<IntakeService>,
    staff: CurrentStaff,
    request: web::Json<IntakeRequest>,
) -> Result<HttpResponse> {
    match intake_service.create(request.into_inner(), staff.0.id).await {
        Ok(intake) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            intake,
            "Intake created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/intake",
    tag = "intake",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "招生批次列表"))
)]
pub async fn list_intakes(
    intake_service: web::Data<IntakeService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match intake_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/intake/count",
    tag = "intake",
    responses((status = 200, description = "未删除的招生批次数量", body = CountResponse))
)]
pub async fn count_intakes(intake_service: web::Data<IntakeService>) -> Result<HttpResponse> {
    match intake_service.count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/intake/{id}",
    tag = "intake",
    params(("id" = i64, Path, description = "招生批次 ID")),
    responses(
        (status = 200, description = "招生批次详情"),
        (status = 404, description = "招生批次不存在")
    )
)]
pub async fn get_intake(
    intake_service: web::Data<IntakeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match intake_service.get(path.into_inner()).await {
        Ok(intake) => Ok(HttpResponse::Ok().json(ApiResponse::success(intake))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/intake/{id}",
    tag = "intake",
    params(("id" = i64, Path, description = "招生批次 ID")),
    request_body = IntakeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "招生批次已更新"),
        (status = 400, description = "截止日期已过，不能重新开放"),
        (status = 404, description = "招生批次不存在")
    )
)]
pub async fn update_intake(
    intake_service: web::Data<IntakeService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
    request: web::Json<IntakeRequest>,
) -> Result<HttpResponse> {
    match intake_service
        .update(path.into_inner(), request.into_inner(), staff.0.id)
        .await
    {
        Ok(intake) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            intake,
            "Intake updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/intake/{id}",
    tag = "intake",
    params(("id" = i64, Path, description = "招生批次 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "招生批次已软删除"),
        (status = 404, description = "招生批次不存在")
    )
)]
pub async fn soft_delete_intake(
    intake_service: web::Data<IntakeService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match intake_service.soft_delete(path.into_inner(), staff.0.id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Intake deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/intake/hard/{id}",
    tag = "intake",
    params(("id" = i64, Path, description = "招生批次 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "招生批次已永久删除"),
        (status = 404, description = "招生批次不存在")
    )
)]
pub async fn hard_delete_intake(
    intake_service: web::Data<IntakeService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match intake_service.hard_delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Intake permanently deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn intake_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/intake")
            .route("", web::post().to(create_intake))
            .route("", web::get().to(list_intakes))
            .route("/count", web::get().to(count_intakes))
            .route("/hard/{id}", web::delete().to(hard_delete_intake))
            .route("/{id}", web::get().to(get_intake))
            .route("/{id}", web::put().to(update_intake))
            .route("/{id}", web::delete().to(soft_delete_intake)),
    );
}
