//! 撮影フロー状態機械
//!
//! 1観測 = 3ステップの写真。撮影 → プレビュー → 保存（またはリテイク）を繰り返し、
//! 全ステップ保存で完了する。カメラ・エンコード・通信は呼び出し側が行い、
//! ここでは結果を受け取って状態だけを遷移させる（I/Oなし）。

use crate::error::{FlowError, Result};
use crate::observation::ObservationId;
use crate::step::CaptureStep;
use crate::view::FlowView;
use std::fmt;

pub const MSG_CAMERA_DENIED: &str = "Camera access denied. Please allow camera permissions.";
pub const MSG_CAPTURE_FAILED: &str = "Unable to capture image.";
pub const MSG_CAPTURED: &str = "Captured. Review and save.";
pub const MSG_SAVED: &str = "Saved. Continue to the next photo.";
pub const MSG_COMPLETE: &str = "Observation saved! Ready for the next one.";
pub const MSG_SAVE_FAILED: &str = "Could not save. Please try again.";
pub const MSG_CANCELED: &str = "Observation canceled. Ready to start over.";
pub const MSG_CANCEL_FAILED: &str = "Could not cancel. Please try again.";
pub const MSG_NEW: &str = "Ready for a new observation.";

/// 「新規観測」ショートカットキー
pub const NEW_OBSERVATION_KEY: char = 'n';

/// 外部から見たフローの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// カメラ取得待ち
    Initializing,
    /// カメラ取得失敗（再読み込みまで撮影不可）
    CameraUnavailable,
    AwaitingCapture(CaptureStep),
    Previewing(CaptureStep),
    Complete,
}

impl FlowState {
    fn describe(&self) -> &'static str {
        match self {
            FlowState::Initializing => "initializing",
            FlowState::CameraUnavailable => "camera is unavailable",
            FlowState::AwaitingCapture(_) => "awaiting capture",
            FlowState::Previewing(_) => "previewing",
            FlowState::Complete => "complete",
        }
    }
}

/// 非同期処理中の操作（完了まで同種・他種の操作を受け付けない）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    Capture,
    Save,
    Cancel,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Initialize => "camera initialization",
            Operation::Capture => "capture",
            Operation::Save => "save",
            Operation::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTone {
    Info,
    Success,
    Error,
}

/// ステータス行に出す一時メッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub tone: MessageTone,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: MessageTone::Info }
    }

    fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: MessageTone::Success }
    }

    fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: MessageTone::Error }
    }
}

/// 観測IDの表示状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservationLabel {
    NotStarted,
    Canceled,
    Active(ObservationId),
}

impl fmt::Display for ObservationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationLabel::NotStarted => f.write_str("Not started"),
            ObservationLabel::Canceled => f.write_str("Canceled"),
            ObservationLabel::Active(id) => write!(f, "{}", id),
        }
    }
}

/// 撮影済み・未保存の画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// アップロードするJPEG（品質92）
    pub bytes: Vec<u8>,
    /// 画面表示専用のData URL（品質90）
    pub preview_url: String,
    pub width: u32,
    pub height: u32,
}

/// アップロード1件分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub observation_id: ObservationId,
    pub step: CaptureStep,
    pub image: Vec<u8>,
}

impl SaveRequest {
    /// サーバー側の保存ファイル名 `{observation_id}_{step}.jpg`
    pub fn file_name(&self) -> String {
        format!("{}_{}.jpg", self.observation_id, self.step.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Device {
    Pending,
    Unavailable,
    Streaming,
}

/// 1セッション分の撮影フロー
///
/// `observation_id` は最初の保存成功で確定し、キャンセルか新規開始までは変わらない。
/// `step_index` は保存成功時にのみ1つ進む。
#[derive(Debug, Clone)]
pub struct CaptureFlow {
    device: Device,
    observation_id: Option<ObservationId>,
    /// 初回保存のために採番したが、まだ保存成功していないID（再送時に使い回す）
    provisional_id: Option<ObservationId>,
    step_index: usize,
    pending: Option<CapturedImage>,
    in_flight: Option<Operation>,
    label: ObservationLabel,
    message: Option<StatusMessage>,
}

impl Default for CaptureFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self {
            device: Device::Pending,
            observation_id: None,
            provisional_id: None,
            step_index: 0,
            pending: None,
            in_flight: None,
            label: ObservationLabel::NotStarted,
            message: None,
        }
    }

    pub fn state(&self) -> FlowState {
        match self.device {
            Device::Pending => FlowState::Initializing,
            Device::Unavailable => FlowState::CameraUnavailable,
            Device::Streaming => match (self.current_step(), self.pending.is_some()) {
                (None, _) => FlowState::Complete,
                (Some(step), true) => FlowState::Previewing(step),
                (Some(step), false) => FlowState::AwaitingCapture(step),
            },
        }
    }

    pub fn observation_id(&self) -> Option<&ObservationId> {
        self.observation_id.as_ref()
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn total_steps(&self) -> usize {
        CaptureStep::COUNT
    }

    pub fn current_step(&self) -> Option<CaptureStep> {
        CaptureStep::at(self.step_index)
    }

    pub fn pending_image(&self) -> Option<&CapturedImage> {
        self.pending.as_ref()
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    pub fn is_streaming(&self) -> bool {
        self.device == Device::Streaming
    }

    pub fn is_complete(&self) -> bool {
        self.state() == FlowState::Complete
    }

    pub fn label(&self) -> &ObservationLabel {
        &self.label
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// 進捗（0.0〜1.0）
    pub fn progress(&self) -> f32 {
        (self.step_index as f32 / CaptureStep::COUNT as f32).clamp(0.0, 1.0)
    }

    pub fn view(&self) -> FlowView {
        FlowView::from_flow(self)
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.in_flight {
            Some(op) => Err(FlowError::Busy(op)),
            None => Ok(()),
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: self.state().describe(),
        }
    }

    fn finish(&mut self, op: Operation, action: &'static str) -> Result<()> {
        if self.in_flight != Some(op) {
            return Err(FlowError::InvalidTransition {
                action,
                state: "no matching request is in flight",
            });
        }
        self.in_flight = None;
        Ok(())
    }

    // --- カメラ ---

    pub fn begin_initialize(&mut self) -> Result<()> {
        self.ensure_idle()?;
        if self.device != Device::Pending {
            return Err(self.invalid("initialize the camera"));
        }
        self.in_flight = Some(Operation::Initialize);
        Ok(())
    }

    pub fn camera_ready(&mut self) -> Result<()> {
        self.finish(Operation::Initialize, "finish camera initialization")?;
        self.device = Device::Streaming;
        Ok(())
    }

    pub fn camera_failed(&mut self) -> Result<()> {
        self.finish(Operation::Initialize, "fail camera initialization")?;
        self.device = Device::Unavailable;
        self.message = Some(StatusMessage::error(MSG_CAMERA_DENIED));
        Ok(())
    }

    // --- 撮影 ---

    /// 撮影開始。対象ステップを返す
    pub fn begin_capture(&mut self) -> Result<CaptureStep> {
        self.ensure_idle()?;
        match self.state() {
            FlowState::AwaitingCapture(step) => {
                self.in_flight = Some(Operation::Capture);
                Ok(step)
            }
            _ => Err(self.invalid("capture")),
        }
    }

    pub fn capture_succeeded(&mut self, image: CapturedImage) -> Result<()> {
        self.finish(Operation::Capture, "finish capture")?;
        self.pending = Some(image);
        self.message = Some(StatusMessage::info(MSG_CAPTURED));
        Ok(())
    }

    pub fn capture_failed(&mut self) -> Result<()> {
        self.finish(Operation::Capture, "fail capture")?;
        self.message = Some(StatusMessage::error(MSG_CAPTURE_FAILED));
        Ok(())
    }

    /// プレビュー中の画像を破棄して同じステップを撮り直す
    pub fn retake(&mut self) -> Result<()> {
        self.ensure_idle()?;
        match self.state() {
            FlowState::Previewing(_) => {
                self.pending = None;
                Ok(())
            }
            _ => Err(self.invalid("retake")),
        }
    }

    // --- 保存 ---

    /// 保存開始（IDは乱数採番）
    pub fn begin_save(&mut self) -> Result<SaveRequest> {
        self.begin_save_with(ObservationId::generate)
    }

    /// 保存開始。IDが未確定なら `generate` で採番する
    ///
    /// 採番したIDは保存成功まで確定しない。失敗後の再送では同じIDを使う。
    pub fn begin_save_with<F>(&mut self, generate: F) -> Result<SaveRequest>
    where
        F: FnOnce() -> ObservationId,
    {
        self.ensure_idle()?;
        let step = match self.state() {
            FlowState::Previewing(step) => step,
            _ => return Err(self.invalid("save")),
        };
        let image = match &self.pending {
            Some(image) => image.bytes.clone(),
            None => return Err(self.invalid("save")),
        };

        let known = self
            .observation_id
            .clone()
            .or_else(|| self.provisional_id.clone());
        let observation_id = match known {
            Some(id) => id,
            None => {
                let id = generate();
                self.provisional_id = Some(id.clone());
                id
            }
        };

        self.in_flight = Some(Operation::Save);
        Ok(SaveRequest {
            observation_id,
            step,
            image,
        })
    }

    pub fn save_succeeded(&mut self) -> Result<()> {
        self.finish(Operation::Save, "finish save")?;
        if let Some(id) = self.provisional_id.take() {
            self.observation_id = Some(id);
        }
        if let Some(id) = &self.observation_id {
            self.label = ObservationLabel::Active(id.clone());
        }
        let finished = self.current_step().map_or(true, |step| step.is_last());
        self.step_index = (self.step_index + 1).min(CaptureStep::COUNT);
        self.pending = None;
        self.message = Some(if finished {
            StatusMessage::success(MSG_COMPLETE)
        } else {
            StatusMessage::info(MSG_SAVED)
        });
        Ok(())
    }

    /// 保存失敗。画像・ステップ・IDはそのまま
    pub fn save_failed(&mut self, reason: Option<&str>) -> Result<()> {
        self.finish(Operation::Save, "fail save")?;
        let text = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!("Could not save ({}). Please try again.", reason),
            None => MSG_SAVE_FAILED.to_string(),
        };
        self.message = Some(StatusMessage::error(text));
        Ok(())
    }

    // --- キャンセル ---

    /// キャンセル開始。IDがなければ何もせず `None`
    pub fn begin_cancel(&mut self) -> Result<Option<ObservationId>> {
        self.ensure_idle()?;
        let Some(id) = self.observation_id.clone() else {
            return Ok(None);
        };
        self.in_flight = Some(Operation::Cancel);
        Ok(Some(id))
    }

    pub fn cancel_succeeded(&mut self) -> Result<()> {
        self.finish(Operation::Cancel, "finish cancel")?;
        self.reset();
        self.label = ObservationLabel::Canceled;
        self.message = Some(StatusMessage::info(MSG_CANCELED));
        Ok(())
    }

    pub fn cancel_failed(&mut self) -> Result<()> {
        self.finish(Operation::Cancel, "fail cancel")?;
        self.message = Some(StatusMessage::error(MSG_CANCEL_FAILED));
        Ok(())
    }

    // --- 新規開始 ---

    /// 完了後に次の観測を始める（通信なし）
    pub fn start_new(&mut self) -> Result<()> {
        self.ensure_idle()?;
        if !self.is_complete() {
            return Err(self.invalid("start a new observation"));
        }
        self.reset();
        self.label = ObservationLabel::NotStarted;
        self.message = Some(StatusMessage::info(MSG_NEW));
        Ok(())
    }

    /// キー入力。完了時の `n` のみ反応し、処理したらtrue
    pub fn handle_key(&mut self, key: char) -> bool {
        if key != NEW_OBSERVATION_KEY || !self.is_complete() || self.in_flight.is_some() {
            return false;
        }
        self.start_new().is_ok()
    }

    fn reset(&mut self) {
        self.observation_id = None;
        self.provisional_id = None;
        self.step_index = 0;
        self.pending = None;
    }
}
