//! 撮影フローコントローラ
//!
//! `CaptureFlow`（状態）・カメラ・保存先サーバーを1つにまとめたもの。
//! デバイス・エンコード・通信エラーはステータスメッセージに変換し、状態は操作前のまま残す。
//! `Err` を返すのは、今の状態で許されない操作を呼んだ場合だけ。

use crate::backend::ObservationBackend;
use crate::camera::{Camera, FacingMode};
use crate::encoder::{self, EncodeSettings};
use crate::error::Result;
use photo_capture_common::{CaptureFlow, FlowView};

/// コントローラ設定
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerSettings {
    pub facing: FacingMode,
    pub encode: EncodeSettings,
}

pub struct CaptureController<C, B> {
    flow: CaptureFlow,
    camera: C,
    backend: B,
    settings: ControllerSettings,
}

impl<C: Camera, B: ObservationBackend> CaptureController<C, B> {
    pub fn new(camera: C, backend: B, settings: ControllerSettings) -> Self {
        Self {
            flow: CaptureFlow::new(),
            camera,
            backend,
            settings,
        }
    }

    pub fn flow(&self) -> &CaptureFlow {
        &self.flow
    }

    pub fn view(&self) -> FlowView {
        self.flow.view()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// カメラを開く。失敗時はメッセージを出して撮影不可のまま（再試行しない）
    pub async fn initialize(&mut self) -> Result<()> {
        self.flow.begin_initialize()?;
        match self.camera.open(self.settings.facing).await {
            Ok(info) => {
                tracing::info!(
                    source = %info.source,
                    facing = ?info.facing,
                    "camera stream started"
                );
                self.flow.camera_ready()?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "camera unavailable");
                self.flow.camera_failed()?;
            }
        }
        Ok(())
    }

    /// 現在のフレームを撮影してプレビューへ
    pub async fn capture_frame(&mut self) -> Result<()> {
        let step = self.flow.begin_capture()?;

        let frame = match self.camera.grab_frame().await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(step = %step, error = %e, "frame grab failed");
                self.flow.capture_failed()?;
                return Ok(());
            }
        };

        match encoder::encode_capture_blocking(frame, self.settings.encode).await {
            Ok(image) => {
                tracing::info!(step = %step, bytes = image.bytes.len(), "frame captured");
                self.flow.capture_succeeded(image)?;
            }
            Err(e) => {
                tracing::warn!(step = %step, error = %e, "frame encoding failed");
                self.flow.capture_failed()?;
            }
        }
        Ok(())
    }

    /// プレビューを破棄（通信なし）
    pub fn retake(&mut self) -> Result<()> {
        self.flow.retake()?;
        tracing::debug!(step_index = self.flow.step_index(), "capture discarded");
        Ok(())
    }

    /// プレビュー中の画像をアップロード
    pub async fn save_capture(&mut self) -> Result<()> {
        let request = self.flow.begin_save()?;

        match self.backend.save(&request).await {
            Ok(receipt) => {
                tracing::info!(
                    observation_id = %request.observation_id,
                    step = %request.step,
                    filename = ?receipt.filename,
                    "capture saved"
                );
                self.flow.save_succeeded()?;
                if self.flow.is_complete() {
                    tracing::info!(observation_id = %request.observation_id, "observation complete");
                }
            }
            Err(e) => {
                tracing::warn!(
                    observation_id = %request.observation_id,
                    step = %request.step,
                    error = %e,
                    "save failed"
                );
                self.flow.save_failed(e.server_message())?;
            }
        }
        Ok(())
    }

    /// 観測を取り消す。IDがなければ何もしない
    pub async fn cancel_observation(&mut self) -> Result<()> {
        let Some(observation_id) = self.flow.begin_cancel()? else {
            tracing::debug!("cancel ignored: no observation id");
            return Ok(());
        };

        match self.backend.cancel(&observation_id).await {
            Ok(receipt) => {
                tracing::info!(
                    observation_id = %observation_id,
                    deleted = receipt.deleted.len(),
                    "observation canceled"
                );
                self.flow.cancel_succeeded()?;
            }
            Err(e) => {
                tracing::warn!(observation_id = %observation_id, error = %e, "cancel failed");
                self.flow.cancel_failed()?;
            }
        }
        Ok(())
    }

    /// 完了後に次の観測へ（通信なし）
    pub fn start_new(&mut self) -> Result<()> {
        self.flow.start_new()?;
        tracing::info!("new observation started");
        Ok(())
    }

    /// キーボードショートカット
    pub fn handle_key(&mut self, key: char) -> bool {
        let handled = self.flow.handle_key(key);
        if handled {
            tracing::info!(key = %key, "new observation started from shortcut");
        }
        handled
    }
}
