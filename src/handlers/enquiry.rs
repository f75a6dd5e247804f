use crate::middlewares::{CurrentStaff, MaybeStaff};
use crate::models::*;
use crate::services::{ContactService, EnquiryNotifier, EnquiryService};
use actix_web::{HttpResponse, ResponseError, Result, http::header, web};
use futures_util::stream;

#[utoipa::path(
    post,
    path = "/enquiries",
    tag = "enquiry",
    request_body = EnquiryRequest,
    responses(
        (status = 201, description = "咨询已提交"),
        (status = 400, description = "请求参数错误或邮箱重复")
    )
)]
pub async fn create_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    caller: MaybeStaff,
    request: web::Json<EnquiryRequest>,
) -> Result<HttpResponse> {
    let actor = caller.0.map(|u| u.id);
    match enquiry_service.create(request.into_inner(), actor).await {
        Ok(enquiry) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            enquiry,
            "Enquiry created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/enquiries",
    tag = "enquiry",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "咨询列表"))
)]
pub async fn list_enquiries(
    enquiry_service: web::Data<EnquiryService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match enquiry_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/enquiries/new/count",
    tag = "enquiry",
    responses((status = 200, description = "新咨询数量及列表", body = NewEnquirySummary))
)]
pub async fn new_enquiry_count(
    enquiry_service: web::Data<EnquiryService>,
) -> Result<HttpResponse> {
    match enquiry_service.new_summary().await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/enquiries/total/count",
    tag = "enquiry",
    responses((status = 200, description = "咨询总数", body = CountResponse))
)]
pub async fn total_enquiry_count(
    enquiry_service: web::Data<EnquiryService>,
) -> Result<HttpResponse> {
    match enquiry_service.count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/enquiries/{id}",
    tag = "enquiry",
    params(("id" = i64, Path, description = "咨询 ID")),
    responses(
        (status = 200, description = "咨询详情"),
        (status = 404, description = "咨询不存在")
    )
)]
pub async fn get_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match enquiry_service.get(path.into_inner()).await {
        Ok(enquiry) => Ok(HttpResponse::Ok().json(ApiResponse::success(enquiry))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/enquiries/{id}",
    tag = "enquiry",
    params(("id" = i64, Path, description = "咨询 ID")),
    request_body = EnquiryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "咨询已更新"),
        (status = 404, description = "咨询不存在")
    )
)]
pub async fn update_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
    request: web::Json<EnquiryRequest>,
) -> Result<HttpResponse> {
    match enquiry_service
        .update(path.into_inner(), request.into_inner(), staff.0.id)
        .await
    {
        Ok(enquiry) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            enquiry,
            "Enquiry updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/enquiries/status/{id}",
    tag = "enquiry",
    params(("id" = i64, Path, description = "咨询 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "咨询已标记为 active"),
        (status = 404, description = "咨询不存在")
    )
)]
pub async fn activate_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match enquiry_service.set_active(path.into_inner(), staff.0.id).await {
        Ok(enquiry) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            enquiry,
            "Enquiry status updated to active",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/enquiries/{id}",
    tag = "enquiry",
    params(("id" = i64, Path, description = "咨询 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "咨询已软删除"),
        (status = 404, description = "咨询不存在")
    )
)]
pub async fn soft_delete_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match enquiry_service.soft_delete(path.into_inner(), staff.0.id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Enquiry deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 连接断开时注销订阅
struct Subscription {
    id: u64,
    notifier: EnquiryNotifier,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let notifier = self.notifier.clone();
        let id = self.id;
        actix_web::rt::spawn(async move { notifier.unsubscribe(id).await });
    }
}

#[utoipa::path(
    get,
    path = "/api/enquiries/stream",
    tag = "enquiry",
    responses((status = 200, description = "新咨询的 SSE 事件流 (text/event-stream)"))
)]
pub async fn enquiry_stream(notifier: web::Data<EnquiryNotifier>) -> HttpResponse {
    let (id, rx) = notifier.subscribe().await;
    let subscription = Subscription {
        id,
        notifier: notifier.get_ref().clone(),
    };

    let events = stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        let frame = rx.recv().await?;
        Some((Ok::<_, actix_web::Error>(frame), (rx, subscription)))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header((header::CONNECTION, "keep-alive"))
        .streaming(events)
}

#[utoipa::path(
    post,
    path = "/contact",
    tag = "contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "留言已提交"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_contact(
    contact_service: web::Data<ContactService>,
    request: web::Json<ContactRequest>,
) -> Result<HttpResponse> {
    match contact_service.create(request.into_inner()).await {
        Ok(contact) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            contact,
            "Message sent successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/contact",
    tag = "contact",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses((status = 200, description = "留言列表"))
)]
pub async fn list_contacts(
    contact_service: web::Data<ContactService>,
    _staff: CurrentStaff,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match contact_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/contact/{id}/status",
    tag = "contact",
    params(("id" = i64, Path, description = "留言 ID")),
    request_body = ContactStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新"),
        (status = 400, description = "状态值无效"),
        (status = 404, description = "留言不存在")
    )
)]
pub async fn update_contact_status(
    contact_service: web::Data<ContactService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
    request: web::Json<ContactStatusRequest>,
) -> Result<HttpResponse> {
    match contact_service
        .set_status(path.into_inner(), request.into_inner().status)
        .await
    {
        Ok(contact) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            contact,
            "Status updated successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/contact/{id}",
    tag = "contact",
    params(("id" = i64, Path, description = "留言 ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "留言已删除"),
        (status = 404, description = "留言不存在")
    )
)]
pub async fn delete_contact(
    contact_service: web::Data<ContactService>,
    _staff: CurrentStaff,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match contact_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Message deleted successfully"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/contact",
    tag = "contact",
    security(
        ("bearer_auth" = [])
    ),
    responses((status = 200, description = "全部留言已删除", body = CountResponse))
)]
pub async fn delete_all_contacts(
    contact_service: web::Data<ContactService>,
    _staff: CurrentStaff,
) -> Result<HttpResponse> {
    match contact_service.delete_all().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            CountResponse { count },
            "All messages deleted successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/contact/count",
    tag = "contact",
    responses((status = 200, description = "留言总数与新留言数", body = ContactCounts))
)]
pub async fn count_contacts(contact_service: web::Data<ContactService>) -> Result<HttpResponse> {
    match contact_service.counts().await {
        Ok(counts) => Ok(HttpResponse::Ok().json(ApiResponse::success(counts))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn enquiry_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/enquiries/stream", web::get().to(enquiry_stream))
        .service(
            web::scope("/enquiries")
                .route("", web::post().to(create_enquiry))
                .route("", web::get().to(list_enquiries))
                .route("/new/count", web::get().to(new_enquiry_count))
                .route("/total/count", web::get().to(total_enquiry_count))
                .route("/status/{id}", web::put().to(activate_enquiry))
                .route("/{id}", web::get().to(get_enquiry))
                .route("/{id}", web::put().to(update_enquiry))
                .route("/{id}", web::patch().to(soft_delete_enquiry)),
        );
}

pub fn contact_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/contact")
            .route("", web::post().to(create_contact))
            .route("", web::get().to(list_contacts))
            .route("", web::delete().to(delete_all_contacts))
            .route("/count", web::get().to(count_contacts))
            .route("/{id}/status", web::put().to(update_contact_status))
            .route("/{id}", web::delete().to(delete_contact)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, body::MessageBody, test};
    use chrono::Utc;

    #[actix_web::test]
    async fn test_stream_delivers_broadcast_frames() {
        let notifier = EnquiryNotifier::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(notifier.clone()))
                .configure(|cfg| {
                    cfg.route("/api/enquiries/stream", web::get().to(enquiry_stream));
                }),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/enquiries/stream").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
        assert_eq!(notifier.client_count().await, 1);

        let n = EnquiryNotification::new(9, "Meera", "Enq09", Utc::now());
        notifier.notify_new_enquiry(&n).await;

        let mut body = resp.into_body();
        let chunk = std::future::poll_fn(|cx| std::pin::Pin::new(&mut body).poll_next(cx))
            .await
            .unwrap()
            .unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        assert!(text.starts_with("event: newEnquiry\n"));
        assert!(text.contains("\"enqNo\":\"Enq09\""));
    }
}
