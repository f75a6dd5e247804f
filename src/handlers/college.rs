use crate::middlewares::{CurrentStaff, UploadForm};
use crate::models::*;
use crate::services::{CollegeService, CourseService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/college",
    tag = "college",
    request_body = CollegeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "院校已创建"),
        (status = 400, description = "请求参数错误或代码重复")
    )
)]
pub async fn create_college(
    college_service: web::Data<CollegeService>,
    staff: CurrentStaff,
    form: UploadForm<CollegeRequest>,
) -> Result<HttpResponse> {
    match college_service
        .create(form.data, form.image, staff.0.id)
        .await
    {
        Ok(college) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            college,
            "College created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/college",
    tag = "college",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量，默认 10"),
        ("search" = Option<String>, Query, description = "名称模糊匹配"),
        ("category" = Option<String>, Query, description = "分类"),
        ("status" = Option<String>, Query, description = "状态"),
        ("country" = Option<i64>, Query, description = "国家 ID")
    ),
    responses((status = 200, description = "院校列表"))
)]
pub async fn list_colleges(
    college_service: web::Data<CollegeService>,
    query: web::Query<CollegeListQuery>,
) -> Result<HttpResponse> {
    match college_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/college/count",
    tag = "college",
    responses((status = 200, description = "未删除的院校数量", body = CountResponse))
)]
pub async fn count_colleges(college_service: web::Data<CollegeService>) -> Result<HttpResponse> {
    match college_service.count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/college/{id}",
    tag = "college",
    params(("id" = i64, Path, description = "院校 ID")),
    responses(
        (status = 200, description = "院校详情"),
        (status = 404, description = "院校不存在")
    )
)]
pub async fn get_college(
    college_service: web::Data<CollegeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match college_service.get(path.into_inner()).await {
        Ok(college) => Ok(HttpResponse::Ok().json(ApiResponse::success(college))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/college/{id}",
    tag = "college",
    params(("id" = i64, Path, description = "院校 ID")),
    request_body = CollegeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "院校已更新"),
        (status = 404, description = "院校不存在")
    )
)]
pub async fn update_college(
    college_service: web::Data<CollegeService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
    form: UploadForm<CollegeRequest>,
) -> Result<HttpResponse> {
    match college_service
        .update(path.into_inner(), form.data, form.image, staff.0.id)
        .await
    {
        Ok(college) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            college,
            "College updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/college/{id}",
    tag = "college",
    params(("id" = i64, Path, description = "院校 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "院校已软删除"),
        (status = 404, description = "院校不存在")
    )
)]
pub async fn soft_delete_college(
    college_service: web::Data<CollegeService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match college_service.soft_delete(path.into_inner(), staff.0.id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("College deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/college/{id}",
    tag = "college",
    params(("id" = i64, Path, description = "院校 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "院校已永久删除"),
        (status = 404, description = "院校不存在")
    )
)]
pub async fn hard_delete_college(
    college_service: web::Data<CollegeService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match college_service.hard_delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "College permanently deleted",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/courses",
    tag = "course",
    request_body = CourseRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "课程已创建"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_course(
    course_service: web::Data<CourseService>,
    staff: CurrentStaff,
    form: UploadForm<CourseRequest>,
) -> Result<HttpResponse> {
    match course_service
        .create(form.data, form.image, staff.0.id)
        .await
    {
        Ok(course) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            course,
            "Course created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/courses",
    tag = "course",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量"),
        ("visible" = Option<bool>, Query, description = "是否只看可见课程")
    ),
    responses((status = 200, description = "课程列表"))
)]
pub async fn list_courses(
    course_service: web::Data<CourseService>,
    query: web::Query<CourseListQuery>,
) -> Result<HttpResponse> {
    match course_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "course",
    params(("id" = i64, Path, description = "课程 ID")),
    responses(
        (status = 200, description = "课程详情"),
        (status = 404, description = "课程不存在")
    )
)]
pub async fn get_course(
    course_service: web::Data<CourseService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match course_service.get(path.into_inner()).await {
        Ok(course) => Ok(HttpResponse::Ok().json(ApiResponse::success(course))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/courses/{id}",
    tag = "course",
    params(("id" = i64, Path, description = "课程 ID")),
    request_body = CourseRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "课程已更新"),
        (status = 404, description = "课程不存在")
    )
)]
pub async fn update_course(
    course_service: web::Data<CourseService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
    form: UploadForm<CourseRequest>,
) -> Result<HttpResponse> {
    match course_service
        .update(path.into_inner(), form.data, form.image, staff.0.id)
        .await
    {
        Ok(course) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            course,
            "Course updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/courses/{id}",
    tag = "course",
    params(("id" = i64, Path, description = "课程 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "课程已删除"),
        (status = 404, description = "课程不存在")
    )
)]
pub async fn delete_course(
    course_service: web::Data<CourseService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match course_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Course deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn college_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/college")
            .route("", web::post().to(create_college))
            .route("", web::get().to(list_colleges))
            .route("/count", web::get().to(count_colleges))
            .route("/{id}", web::get().to(get_college))
            .route("/{id}", web::put().to(update_college))
            .route("/{id}", web::patch().to(soft_delete_college))
            .route("/{id}", web::delete().to(hard_delete_college)),
    );
}

pub fn course_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/courses")
            .route("", web::post().to(create_course))
            .route("", web::get().to(list_courses))
            .route("/{id}", web::get().to(get_course))
            .route("/{id}", web::put().to(update_course))
            .route("/{id}", web::delete().to(delete_course)),
    );
}
