//! カメラ入力
//!
//! 向きの希望を渡してストリームを開き、撮影時に現在のフレームを1枚取り出す。
//! ストリームはセッション中ずっと保持する。

mod folder;

pub use folder::FolderCamera;

use async_trait::async_trait;
use clap::ValueEnum;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// カメラの向き（希望）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// 背面カメラ
    #[default]
    Environment,
    /// 前面カメラ
    User,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("カメラへのアクセスが拒否されました: {0}")]
    PermissionDenied(String),

    #[error("カメラが見つかりません: {0}")]
    NoDevice(String),

    #[error("カメラは使用中です")]
    DeviceBusy,

    #[error("カメラのストリームが開始されていません")]
    NotStreaming,

    #[error("フレーム読み込みエラー: {0}")]
    Frame(String),
}

/// 開いたストリームの情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub source: String,
    /// 希望の向きが満たされた場合のみSome
    pub facing: Option<FacingMode>,
}

#[async_trait]
pub trait Camera: Send {
    /// ストリームを開く。権限拒否・デバイスなし・使用中はエラー
    async fn open(&mut self, facing: FacingMode) -> Result<StreamInfo, CameraError>;

    /// 現在のフレームをネイティブ解像度で取得
    async fn grab_frame(&mut self) -> Result<RgbImage, CameraError>;
}
