//! 保存先サーバーとの通信
//!
//! - `POST /save`   : observation_id, step, image（multipart）
//! - `POST /cancel` : observation_id（multipart）
//! - `GET  /health` : 死活確認

mod http;
mod types;

pub use http::HttpBackend;
pub use types::{CancelReceipt, HealthResponse, SaveReceipt};

use crate::error::Result;
use async_trait::async_trait;
use photo_capture_common::{ObservationId, SaveRequest};

#[async_trait]
pub trait ObservationBackend: Send + Sync {
    /// 1枚アップロード。HTTPエラー・`ok: false` はErr
    async fn save(&self, request: &SaveRequest) -> Result<SaveReceipt>;

    /// 観測を取り消す。2xxなら成功
    async fn cancel(&self, observation_id: &ObservationId) -> Result<CancelReceipt>;

    async fn health(&self) -> Result<()>;
}
