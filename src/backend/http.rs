//! reqwestによるHTTP実装

use super::{CancelReceipt, HealthResponse, ObservationBackend, SaveReceipt};
use crate::error::{CaptureError, Result};
use async_trait::async_trait;
use photo_capture_common::{ObservationId, SaveRequest};
use reqwest::multipart;

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// タイムアウトは設定しない（通信層が失敗させるまで待つ）
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CaptureError::Config(format!(
                "サーバーURLは http:// または https:// で始めてください: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CaptureError::Network(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// 非2xxの本文から `error` を拾う（JSONでなければNone）
fn error_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<SaveReceipt>(body)
        .ok()
        .and_then(|r| r.error)
        .filter(|e| !e.trim().is_empty())
}

#[async_trait]
impl ObservationBackend for HttpBackend {
    async fn save(&self, request: &SaveRequest) -> Result<SaveReceipt> {
        let image_part = multipart::Part::bytes(request.image.clone())
            .file_name(request.file_name())
            .mime_str("image/jpeg")?;

        let form = multipart::Form::new()
            .text("observation_id", request.observation_id.to_string())
            .text("step", request.step.key())
            .part("image", image_part);

        tracing::debug!(
            observation_id = %request.observation_id,
            step = %request.step,
            bytes = request.image.len(),
            "uploading capture"
        );

        let response = self
            .client
            .post(self.endpoint("save"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CaptureError::Server {
                status: status.as_u16(),
                message: error_from_body(&body),
            });
        }

        let receipt: SaveReceipt = serde_json::from_str(&body)?;
        if !receipt.ok {
            return Err(CaptureError::Rejected(
                receipt.error.unwrap_or_else(|| "Save failed".to_string()),
            ));
        }

        Ok(receipt)
    }

    async fn cancel(&self, observation_id: &ObservationId) -> Result<CancelReceipt> {
        let form = multipart::Form::new().text("observation_id", observation_id.to_string());

        let response = self
            .client
            .post(self.endpoint("cancel"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(CaptureError::Server {
                status: status.as_u16(),
                message: error_from_body(&body),
            });
        }

        // 2xxなら本文に関わらず成功
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn health(&self) -> Result<()> {
        let response = self.client.get(self.endpoint("health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::Server {
                status: status.as_u16(),
                message: None,
            });
        }

        let health: HealthResponse = response.json().await?;
        if !health.ok {
            return Err(CaptureError::Rejected("ヘルスチェックがNGを返しました".into()));
        }
        Ok(())
    }
}
