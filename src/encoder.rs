//! フレーム → JPEG変換
//!
//! アップロード用（品質92）とプレビュー表示用（品質90, Data URL）を別々にエンコードする。

use crate::error::{CaptureError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use photo_capture_common::CapturedImage;

pub const CAPTURE_QUALITY: u8 = 92;
pub const PREVIEW_QUALITY: u8 = 90;

/// JPEG品質設定
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeSettings {
    pub capture_quality: u8,
    pub preview_quality: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            capture_quality: CAPTURE_QUALITY,
            preview_quality: PREVIEW_QUALITY,
        }
    }
}

/// RGBフレームをJPEGに変換。空の出力はエラー
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(CaptureError::Encode("フレームが空です".into()));
    }

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode_image(frame)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    if buf.is_empty() {
        return Err(CaptureError::Encode("エンコード結果が空です".into()));
    }
    Ok(buf)
}

/// プレビュー用Data URL
pub fn preview_data_url(frame: &RgbImage, quality: u8) -> Result<String> {
    let jpeg = encode_jpeg(frame, quality)?;
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)))
}

/// 撮影1回分（アップロード用 + プレビュー用）
pub fn encode_capture(frame: &RgbImage, settings: &EncodeSettings) -> Result<CapturedImage> {
    let bytes = encode_jpeg(frame, settings.capture_quality)?;
    let preview_url = preview_data_url(frame, settings.preview_quality)?;

    tracing::debug!(
        width = frame.width(),
        height = frame.height(),
        bytes = bytes.len(),
        "frame encoded"
    );

    Ok(CapturedImage {
        bytes,
        preview_url,
        width: frame.width(),
        height: frame.height(),
    })
}

/// `encode_capture` をブロッキングスレッドで実行
pub async fn encode_capture_blocking(
    frame: RgbImage,
    settings: EncodeSettings,
) -> Result<CapturedImage> {
    tokio::task::spawn_blocking(move || encode_capture(&frame, &settings))
        .await
        .map_err(|e| CaptureError::Encode(e.to_string()))?
}

/// Data URLからJPEGバイト列を取り出す
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = url
        .strip_prefix("data:image/jpeg;base64,")
        .ok_or_else(|| CaptureError::Encode("JPEGのData URLではありません".into()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| CaptureError::Encode(e.to_string()))
}
