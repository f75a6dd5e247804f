//! Request bodies for endpoints that take an optional image: either
//! `multipart/form-data` (text fields plus an `image` file) or plain JSON.

use crate::error::AppError;
use crate::external::{MAX_IMAGE_BYTES, UploadedFile};
use actix_multipart::Multipart;
use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures_util::StreamExt;
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub const IMAGE_FIELD: &str = "image";
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

pub struct UploadForm<T> {
    pub data: T,
    pub image: Option<UploadedFile>,
}

/// 表单字段都是文本：布尔值和 JSON 数组/对象按原样还原，其余保留为字符串
pub fn coerce_text(text: String) -> Value {
    let trimmed = text.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return value;
        }
    }
    Value::String(text)
}

/// Repeated names (`skills`, `skills[]`) collect into an array.
pub fn insert_field(map: &mut Map<String, Value>, name: &str, value: Value) {
    let key = name.strip_suffix("[]").unwrap_or(name);
    match map.get_mut(key) {
        None if name.ends_with("[]") => {
            map.insert(key.to_string(), Value::Array(vec![value]));
        }
        None => {
            map.insert(key.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<(Map<String, Value>, Option<UploadedFile>), AppError> {
    let mut fields = Map::new();
    let mut image = None;

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|e| AppError::ValidationError(format!("Malformed form data: {e}")))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let limit = if file_name.is_some() {
            MAX_IMAGE_BYTES
        } else {
            MAX_TEXT_FIELD_BYTES
        };
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::ValidationError(format!("Malformed form data: {e}")))?;
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::ValidationError(format!(
                    "Field {name} is too large"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match file_name {
            Some(file_name) if name == IMAGE_FIELD => {
                if bytes.is_empty() {
                    continue;
                }
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file = UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                };
                file.validate_image()?;
                image = Some(file);
            }
            Some(file_name) => {
                log::warn!("Ignored unexpected file field {} ({})", name, file_name);
            }
            None => {
                let text = String::from_utf8(bytes).map_err(|_| {
                    AppError::ValidationError(format!("Field {name} is not valid UTF-8"))
                })?;
                insert_field(&mut fields, &name, coerce_text(text));
            }
        }
    }

    Ok((fields, image))
}

impl<T> FromRequest for UploadForm<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, payload);
            Box::pin(async move {
                let (fields, image) = read_multipart(multipart.await?).await?;
                let data = serde_json::from_value::<T>(Value::Object(fields))
                    .map_err(|e| AppError::ValidationError(format!("Invalid form data: {e}")))?;
                Ok(UploadForm { data, image })
            })
        } else {
            let json = web::Json::<T>::from_request(req, payload);
            Box::pin(async move {
                let data = json.await?.into_inner();
                Ok(UploadForm { data, image: None })
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test};
    use serde::Deserialize;
    use serde_json::json;

    #[::core::prelude::v1::test]
    fn test_coerce_text() {
        assert_eq!(coerce_text("true".into()), json!(true));
        assert_eq!(coerce_text("[\"a\",\"b\"]".into()), json!(["a", "b"]));
        assert_eq!(coerce_text("9876543210".into()), json!("9876543210"));
        assert_eq!(coerce_text("[not json".into()), json!("[not json"));
    }

    #[::core::prelude::v1::test]
    fn test_repeated_fields_collect() {
        let mut map = Map::new();
        insert_field(&mut map, "skills", json!("care"));
        insert_field(&mut map, "skills", json!("triage"));
        insert_field(&mut map, "tags[]", json!("uk"));
        insert_field(&mut map, "title", json!("Nurse"));
        assert_eq!(map["skills"], json!(["care", "triage"]));
        assert_eq!(map["tags"], json!(["uk"]));
        assert_eq!(map["title"], json!("Nurse"));
    }

    #[derive(Deserialize)]
    struct Probe {
        title: Option<String>,
        visible: Option<bool>,
    }

    async fn probe(form: UploadForm<Probe>) -> HttpResponse {
        HttpResponse::Ok().json(json!({
            "title": form.data.title,
            "visible": form.data.visible,
            "image": form.image.map(|f| f.file_name),
        }))
    }

    #[actix_web::test]
    async fn test_multipart_and_json_bodies() {
        let app = test::init_service(App::new().route("/", web::post().to(probe))).await;

        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            Campus day\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"visible\"\r\n\r\n\
            false\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"image\"; filename=\"campus.png\"\r\n\
            Content-Type: image/png\r\n\r\n\
            PNGDATA\r\n\
            --XYZ--\r\n";
        let req = test::TestRequest::post()
            .uri("/")
            .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=XYZ"))
            .set_payload(body)
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            resp,
            json!({ "title": "Campus day", "visible": false, "image": "campus.png" })
        );

        let req = test::TestRequest::post()
            .uri("/")
            .set_json(json!({ "title": "Plain", "visible": true }))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp, json!({ "title": "Plain", "visible": true, "image": null }));
    }
}
