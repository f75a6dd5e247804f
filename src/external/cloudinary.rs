use super::storage::{FileStorage, StoredAsset, UploadedFile};
use crate::config::CloudinaryConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde::Deserialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Deserialize)]
struct UploadResult {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResult {
    result: String,
}

/// Signed uploads against the Cloudinary REST API.
#[derive(Clone)]
pub struct CloudinaryStorage {
    client: Client,
    config: CloudinaryConfig,
}

/// 参数按 key 排序后拼接，末尾追加 secret 再做 SHA-256
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

impl CloudinaryStorage {
    pub fn new(config: CloudinaryConfig) -> AppResult<Self> {
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(AppError::ConfigError(
                "Cloudinary storage requires cloud_name, api_key and api_secret".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.config.cloud_name, action
        )
    }

    async fn error_text(response: reqwest::Response) -> String {
        response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string())
    }
}

#[async_trait]
impl FileStorage for CloudinaryStorage {
    async fn store(&self, folder: &str, file: &UploadedFile) -> AppResult<StoredAsset> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = Self::error_text(response).await;
            log::error!("Cloudinary upload failed: {}", error_text);
            return Err(AppError::ExternalApiError(format!(
                "Image upload failed: {error_text}"
            )));
        }

        let result: UploadResult = response.json().await?;
        log::info!("Cloudinary upload stored as {}", result.public_id);
        Ok(StoredAsset {
            url: result.secure_url,
            asset_id: result.public_id,
        })
    }

    async fn remove(&self, asset_id: &str) -> AppResult<()> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", asset_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );
        let params = [
            ("public_id", asset_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = Self::error_text(response).await;
            log::error!("Cloudinary destroy failed for {}: {}", asset_id, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Image removal failed: {error_text}"
            )));
        }

        let result: DestroyResult = response.json().await?;
        if result.result != "ok" && result.result != "not found" {
            log::warn!("Cloudinary destroy for {} returned {}", asset_id, result.result);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_order_independent() {
        let a = sign(&[("timestamp", "1700000000"), ("folder", "blogs")], "secret");
        let b = sign(&[("folder", "blogs"), ("timestamp", "1700000000")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, sign(&[("folder", "blogs"), ("timestamp", "1700000000")], "other"));
    }

    #[test]
    fn test_requires_credentials() {
        assert!(CloudinaryStorage::new(CloudinaryConfig::default()).is_err());
        let ok = CloudinaryStorage::new(CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        })
        .unwrap();
        assert_eq!(
            ok.endpoint("upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }
}
