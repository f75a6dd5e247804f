use crate::middlewares::{CurrentStaff, UploadForm};
use crate::models::*;
use crate::services::{BlogService, GalleryService, OfferingService};
use actix_web::{HttpResponse, ResponseError, Result, web};

// ---- blog ----

#[utoipa::path(
    post,
    path = "/blog",
    tag = "blog",
    request_body = BlogRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "博客已创建"),
        (status = 400, description = "请求参数错误或链接重复")
    )
)]
pub async fn create_blog(
    blog_service: web::Data<BlogService>,
    staff: CurrentStaff,
    form: UploadForm<BlogRequest>,
) -> Result<HttpResponse> {
    match blog_service.create(form.data, form.image, staff.0.id).await {
        Ok(blog) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            blog,
            "Blog created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/blog",
    tag = "blog",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "博客列表"))
)]
pub async fn list_blogs(
    blog_service: web::Data<BlogService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match blog_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/blog/{id}",
    tag = "blog",
    params(("id" = i64, Path, description = "博客 ID")),
    responses(
        (status = 200, description = "博客详情"),
        (status = 404, description = "博客不存在")
    )
)]
pub async fn get_blog(
    blog_service: web::Data<BlogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match blog_service.get(path.into_inner()).await {
        Ok(blog) => Ok(HttpResponse::Ok().json(ApiResponse::success(blog))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/blog/{id}",
    tag = "blog",
    params(("id" = i64, Path, description = "博客 ID")),
    request_body = BlogRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "博客已更新"),
        (status = 404, description = "博客不存在")
    )
)]
pub async fn update_blog(
    blog_service: web::Data<BlogService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
    form: UploadForm<BlogRequest>,
) -> Result<HttpResponse> {
    match blog_service
        .update(path.into_inner(), form.data, form.image, staff.0.id)
        .await
    {
        Ok(blog) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            blog,
            "Blog updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/blog/{id}",
    tag = "blog",
    params(("id" = i64, Path, description = "博客 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "博客已软删除，图片一并移除"),
        (status = 404, description = "博客不存在")
    )
)]
pub async fn soft_delete_blog(
    blog_service: web::Data<BlogService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match blog_service.soft_delete(path.into_inner(), staff.0.id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Blog deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/blog/{id}",
    tag = "blog",
    params(("id" = i64, Path, description = "博客 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "博客已永久删除"),
        (status = 404, description = "博客不存在")
    )
)]
pub async fn hard_delete_blog(
    blog_service: web::Data<BlogService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match blog_service.hard_delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Blog permanently deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- gallery ----

#[utoipa::path(
    post,
    path = "/gallery",
    tag = "gallery",
    request_body = GalleryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "图库条目已创建"),
        (status = 400, description = "缺少图片")
    )
)]
pub async fn create_gallery_item(
    gallery_service: web::Data<GalleryService>,
    staff: CurrentStaff,
    form: UploadForm<GalleryRequest>,
) -> Result<HttpResponse> {
    match gallery_service
        .create(form.data, form.image, staff.0.id)
        .await
    {
        Ok(item) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            item,
            "Gallery item created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/gallery",
    tag = "gallery",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "图库列表"))
)]
pub async fn list_gallery(
    gallery_service: web::Data<GalleryService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match gallery_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/gallery/{id}",
    tag = "gallery",
    params(("id" = i64, Path, description = "图库条目 ID")),
    responses(
        (status = 200, description = "图库条目详情"),
        (status = 404, description = "图库条目不存在")
    )
)]
pub async fn get_gallery_item(
    gallery_service: web::Data<GalleryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match gallery_service.get(path.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiResponse::success(item))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/gallery/{id}",
    tag = "gallery",
    params(("id" = i64, Path, description = "图库条目 ID")),
    request_body = GalleryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "图库条目已更新"),
        (status = 404, description = "图库条目不存在")
    )
)]
pub async fn update_gallery_item(
    gallery_service: web::Data<GalleryService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
    form: UploadForm<GalleryRequest>,
) -> Result<HttpResponse> {
    match gallery_service
        .update(path.into_inner(), form.data, form.image, staff.0.id)
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            item,
            "Gallery item updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/gallery/soft/{id}",
    tag = "gallery",
    params(("id" = i64, Path, description = "图库条目 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "图库条目已软删除"),
        (status = 404, description = "图库条目不存在")
    )
)]
pub async fn soft_delete_gallery_item(
    gallery_service: web::Data<GalleryService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match gallery_service.soft_delete(path.into_inner(), staff.0.id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Gallery item deleted successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/gallery/hard/{id}",
    tag = "gallery",
    params(("id" = i64, Path, description = "图库条目 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "图库条目已永久删除"),
        (status = 404, description = "图库条目不存在")
    )
)]
pub async fn hard_delete_gallery_item(
    gallery_service: web::Data<GalleryService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match gallery_service.hard_delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Gallery item permanently deleted",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---- services ----

#[utoipa::path(
    post,
    path = "/services",
    tag = "service",
    request_body = OfferingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "服务已创建"),
        (status = 400, description = "请求参数错误或缺少图片")
    )
)]
pub async fn create_offering(
    offering_service: web::Data<OfferingService>,
    staff: CurrentStaff,
    form: UploadForm<OfferingRequest>,
) -> Result<HttpResponse> {
    match offering_service
        .create(form.data, form.image, staff.0.id)
        .await
    {
        Ok(offering) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            offering,
            "Service created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/services",
    tag = "service",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "服务列表"))
)]
pub async fn list_offerings(
    offering_service: web::Data<OfferingService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match offering_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/services/count",
    tag = "service",
    responses((status = 200, description = "未删除的服务数量", body = CountResponse))
)]
pub async fn count_offerings(
    offering_service: web::Data<OfferingService>,
) -> Result<HttpResponse> {
    match offering_service.count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "service",
    params(("id" = i64, Path, description = "服务 ID")),
    responses(
        (status = 200, description = "服务详情"),
        (status = 404, description = "服务不存在")
    )
)]
pub async fn get_offering(
    offering_service: web::Data<OfferingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match offering_service.get(path.into_inner()).await {
        Ok(offering) => Ok(HttpResponse::Ok().json(ApiResponse::success(offering))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "service",
    params(("id" = i64, Path, description = "服务 ID")),
    request_body = OfferingRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "服务已更新"),
        (status = 404, description = "服务不存在")
    )
)]
pub async fn update_offering(
    offering_service: web::Data<OfferingService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
    form: UploadForm<OfferingRequest>,
) -> Result<HttpResponse> {
    match offering_service
        .update(path.into_inner(), form.data, form.image, staff.0.id)
        .await
    {
        Ok(offering) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            offering,
            "Service updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/services/{id}",
    tag = "service",
    params(("id" = i64, Path, description = "服务 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "服务已软删除"),
        (status = 404, description = "服务不存在")
    )
)]
pub async fn soft_delete_offering(
    offering_service: web::Data<OfferingService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match offering_service
        .soft_delete(path.into_inner(), staff.0.id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Service deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "service",
    params(("id" = i64, Path, description = "服务 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "服务已永久删除"),
        (status = 404, description = "服务不存在")
    )
)]
pub async fn hard_delete_offering(
    offering_service: web::Data<OfferingService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match offering_service.hard_delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Service permanently deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn blog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blog")
            .route("", web::post().to(create_blog))
            .route("", web::get().to(list_blogs))
            .route("/{id}", web::get().to(get_blog))
            .route("/{id}", web::put().to(update_blog))
            .route("/{id}", web::patch().to(soft_delete_blog))
            .route("/{id}", web::delete().to(hard_delete_blog)),
    );
}

pub fn gallery_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gallery")
            .route("", web::post().to(create_gallery_item))
            .route("", web::get().to(list_gallery))
            .route("/soft/{id}", web::delete().to(soft_delete_gallery_item))
            .route("/hard/{id}", web::delete().to(hard_delete_gallery_item))
            .route("/{id}", web::get().to(get_gallery_item))
            .route("/{id}", web::put().to(update_gallery_item)),
    );
}

pub fn offering_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("", web::post().to(create_offering))
            .route("", web::get().to(list_offerings))
            .route("/count", web::get().to(count_offerings))
            .route("/{id}", web::get().to(get_offering))
            .route("/{id}", web::put().to(update_offering))
            .route("/{id}", web::patch().to(soft_delete_offering))
            .route("/{id}", web::delete().to(hard_delete_offering)),
    );
}
