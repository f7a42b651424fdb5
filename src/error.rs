use crate::camera::CameraError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カメラエラー: {0}")]
    Camera(#[from] CameraError),

    #[error("画像エンコードエラー: {0}")]
    Encode(String),

    #[error("通信エラー: {0}")]
    Network(String),

    #[error("サーバーエラー (HTTP {status}){}", detail_suffix(.message))]
    Server { status: u16, message: Option<String> },

    #[error("サーバーが保存を拒否しました: {0}")]
    Rejected(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Flow(#[from] photo_capture_common::FlowError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// サーバーが返したエラーメッセージ（ステータス行に表示する）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            CaptureError::Rejected(message) => Some(message),
            CaptureError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CaptureError {
    fn from(err: reqwest::Error) -> Self {
        CaptureError::Network(err.to_string())
    }
}

fn detail_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, CaptureError>;
