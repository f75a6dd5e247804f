use crate::middlewares::CurrentStaff;
use crate::models::*;
use crate::services::{CouponService, PackageService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/coupons",
    tag = "coupon",
    request_body = CouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "优惠券已创建"),
        (status = 400, description = "请求参数错误或代码重复")
    )
)]
pub async fn create_coupon(
    coupon_service: web::Data<CouponService>,
    _staff: CurrentStaff,
    request: web::Json<CouponRequest>,
) -> Result<HttpResponse> {
    match coupon_service.create(request.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            coupon,
            "Coupon created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/coupons/validate",
    tag = "coupon",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "优惠券可用"),
        (status = 400, description = "优惠券未启用或已过期"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn validate_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<ValidateCouponRequest>,
) -> Result<HttpResponse> {
    match coupon_service.validate(request.code.as_deref()).await {
        Ok(coupon) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            coupon,
            "Coupon is valid",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/coupons",
    tag = "coupon",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "优惠券列表"))
)]
pub async fn list_coupons(
    coupon_service: web::Data<CouponService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match coupon_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/coupons/{id}",
    tag = "coupon",
    params(("id" = i64, Path, description = "优惠券 ID")),
    responses(
        (status = 200, description = "优惠券详情"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn get_coupon(
    coupon_service: web::Data<CouponService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match coupon_service.get(path.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Ok().json(ApiResponse::success(coupon))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/coupons/{id}",
    tag = "coupon",
    params(("id" = i64, Path, description = "优惠券 ID")),
    request_body = CouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "优惠券已更新"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn update_coupon(
    coupon_service: web::Data<CouponService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
    request: web::Json<CouponRequest>,
) -> Result<HttpResponse> {
    match coupon_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(coupon) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            coupon,
            "Coupon updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/coupons/{id}",
    tag = "coupon",
    params(("id" = i64, Path, description = "优惠券 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "优惠券已删除"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn delete_coupon(
    coupon_service: web::Data<CouponService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match coupon_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Coupon deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/packages",
    tag = "package",
    request_body = PackageRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "套餐已创建"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_package(
    package_service: web::Data<PackageService>,
    _staff: CurrentStaff,
    request: web::Json<PackageRequest>,
) -> Result<HttpResponse> {
    match package_service.create(request.into_inner()).await {
        Ok(package) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            package,
            "Package created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/packages/apply-coupon",
    tag = "package",
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "折后价预览"),
        (status = 400, description = "优惠券不可用"),
        (status = 404, description = "优惠券或套餐不存在")
    )
)]
pub async fn apply_coupon(
    package_service: web::Data<PackageService>,
    request: web::Json<ApplyCouponRequest>,
) -> Result<HttpResponse> {
    match package_service.apply_coupon(request.into_inner()).await {
        Ok(quote) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            quote,
            "Coupon applied successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/packages",
    tag = "package",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "套餐列表"))
)]
pub async fn list_packages(
    package_service: web::Data<PackageService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match package_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/packages/count",
    tag = "package",
    responses((status = 200, description = "套餐数量", body = CountResponse))
)]
pub async fn count_packages(package_service: web::Data<PackageService>) -> Result<HttpResponse> {
    match package_service.count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/packages/{id}",
    tag = "package",
    params(("id" = i64, Path, description = "套餐 ID")),
    responses(
        (status = 200, description = "套餐详情"),
        (status = 404, description = "套餐不存在")
    )
)]
pub async fn get_package(
    package_service: web::Data<PackageService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match package_service.get(path.into_inner()).await {
        Ok(package) => Ok(HttpResponse::Ok().json(ApiResponse::success(package))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/packages/{id}",
    tag = "package",
    params(("id" = i64, Path, description = "套餐 ID")),
    request_body = PackageRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "套餐已更新"),
        (status = 404, description = "套餐不存在")
    )
)]
pub async fn update_package(
    package_service: web::Data<PackageService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
    request: web::Json<PackageRequest>,
) -> Result<HttpResponse> {
    match package_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(package) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            package,
            "Package updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/packages/{id}",
    tag = "package",
    params(("id" = i64, Path, description = "套餐 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "套餐已删除"),
        (status = 404, description = "套餐不存在")
    )
)]
pub async fn delete_package(
    package_service: web::Data<PackageService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match package_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Package deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn coupon_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/coupons")
            .route("", web::post().to(create_coupon))
            .route("", web::get().to(list_coupons))
            .route("/validate", web::post().to(validate_coupon))
            .route("/{id}", web::get().to(get_coupon))
            .route("/{id}", web::put().to(update_coupon))
            .route("/{id}", web::delete().to(delete_coupon)),
    );
}

pub fn package_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/packages")
            .route("", web::post().to(create_package))
            .route("", web::get().to(list_packages))
            .route("/count", web::get().to(count_packages))
            .route("/apply-coupon", web::post().to(apply_coupon))
            .route("/{id}", web::get().to(get_package))
            .route("/{id}", web::put().to(update_package))
            .route("/{id}", web::delete().to(delete_package)),
    );
}
