use crate::error::AppError;
use crate::external::FileStorage;
use crate::middlewares::{CurrentStaff, UploadForm};
use crate::models::*;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use std::sync::Arc;

const UPLOAD_FOLDER: &str = "uploads";

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Hello, Server Started" }))
}

#[utoipa::path(
    post,
    path = "/cloudinary/upload",
    tag = "upload",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "图片已上传", body = UploadResponse),
        (status = 400, description = "未上传文件或文件类型不支持")
    )
)]
pub async fn upload_image(
    storage: web::Data<Arc<dyn FileStorage>>,
    _staff: CurrentStaff,
    form: UploadForm<serde_json::Value>,
) -> Result<HttpResponse> {
    let Some(file) = form.image else {
        return Ok(AppError::ValidationError("No file uploaded".to_string()).error_response());
    };
    match storage.store(UPLOAD_FOLDER, &file).await {
        Ok(asset) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            UploadResponse {
                url: asset.url,
                public_id: asset.asset_id,
            },
            "Image uploaded successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn common_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/cloudinary/upload", web::post().to(upload_image));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_index_greets() {
        let app = test::init_service(App::new().configure(common_config)).await;
        let resp: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(resp["message"], "Hello, Server Started");
    }
}
