use crate::middlewares::{CurrentStaff, UploadForm};
use crate::models::*;
use crate::services::CountryService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/countries",
    tag = "country",
    request_body = CountryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "国家已创建"),
        (status = 400, description = "请求参数错误或名称重复")
    )
)]
pub async fn create_country(
    country_service: web::Data<CountryService>,
    staff: CurrentStaff,
    form: UploadForm<CountryRequest>,
) -> Result<HttpResponse> {
    match country_service
        .create(form.data, form.image, staff.0.id)
        .await
    {
        Ok(country) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            country,
            "Country created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/countries",
    tag = "country",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "国家列表"))
)]
pub async fn list_countries(
    country_service: web::Data<CountryService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match country_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/countries/count",
    tag = "country",
    responses((status = 200, description = "未删除的国家数量", body = CountResponse))
)]
pub async fn count_countries(country_service: web::Data<CountryService>) -> Result<HttpResponse> {
    match country_service.count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/countries/{id}",
    tag = "country",
    params(("id" = i64, Path, description = "国家 ID")),
    responses(
        (status = 200, description = "国家详情"),
        (status = 404, description = "国家不存在")
    )
)]
pub async fn get_country(
    country_service: web::Data<CountryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match country_service.get(path.into_inner()).await {
        Ok(country) => Ok(HttpResponse::Ok().json(ApiResponse::success(country))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/countries/{id}",
    tag = "country",
    params(("id" = i64, Path, description = "国家 ID")),
    request_body = CountryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "国家已更新"),
        (status = 404, description = "国家不存在")
    )
)]
pub async fn update_country(
    country_service: web::Data<CountryService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
    form: UploadForm<CountryRequest>,
) -> Result<HttpResponse> {
    match country_service
        .update(path.into_inner(), form.data, form.image, staff.0.id)
        .await
    {
        Ok(country) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            country,
            "Country updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/countries/{id}",
    tag = "country",
    params(("id" = i64, Path, description = "国家 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "国家已删除"),
        (status = 400, description = "默认国家不可删除"),
        (status = 404, description = "国家不存在")
    )
)]
pub async fn delete_country(
    country_service: web::Data<CountryService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match country_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Country deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn country_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/countries")
            .route("", web::post().to(create_country))
            .route("", web::get().to(list_countries))
            .route("/count", web::get().to(count_countries))
            .route("/{id}", web::get().to(get_country))
            .route("/{id}", web::put().to(update_country))
            .route("/{id}", web::delete().to(delete_country)),
    );
}
