//! 画面表示用の派生値
//!
//! 進捗バー・ステップ表示・指示文・観測ID・ステータス行・ボタンの有効状態。

use crate::flow::{CaptureFlow, FlowState, StatusMessage};
use crate::step::CaptureStep;

pub const COMPLETE_LABEL: &str = "Complete";
pub const COMPLETE_INSTRUCTIONS: &str = "All photos captured. Start a new observation.";

/// 押せる操作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub capture: bool,
    pub save: bool,
    pub retake: bool,
    pub cancel: bool,
    pub start_new: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowView {
    pub state: FlowState,
    /// 0.0〜1.0
    pub progress: f32,
    pub step_label: String,
    pub instructions: String,
    pub observation: String,
    pub message: Option<StatusMessage>,
    pub preview_url: Option<String>,
    pub controls: Controls,
}

impl FlowView {
    pub fn from_flow(flow: &CaptureFlow) -> Self {
        let state = flow.state();
        let idle = flow.in_flight().is_none();

        let (step_label, instructions) = match flow.current_step() {
            Some(step) => (step_label(step), step.label().to_string()),
            None => (COMPLETE_LABEL.to_string(), COMPLETE_INSTRUCTIONS.to_string()),
        };

        let previewing = matches!(state, FlowState::Previewing(_));
        let controls = Controls {
            capture: idle && matches!(state, FlowState::AwaitingCapture(_)),
            save: idle && previewing,
            retake: idle && previewing,
            cancel: idle && flow.observation_id().is_some(),
            start_new: idle && state == FlowState::Complete,
        };

        Self {
            state,
            progress: flow.progress(),
            step_label,
            instructions,
            observation: flow.label().to_string(),
            message: flow.message().cloned(),
            preview_url: flow.pending_image().map(|image| image.preview_url.clone()),
            controls,
        }
    }

    /// 進捗（0〜100%）
    pub fn progress_percent(&self) -> u8 {
        (self.progress * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// "Step N of 3"
pub fn step_label(step: CaptureStep) -> String {
    format!("Step {} of {}", step.position() + 1, CaptureStep::COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{CapturedImage, Operation};
    use crate::observation::ObservationId;

    fn streaming_flow() -> CaptureFlow {
        let mut flow = CaptureFlow::new();
        flow.begin_initialize().unwrap();
        flow.camera_ready().unwrap();
        flow
    }

    fn capture(flow: &mut CaptureFlow) {
        flow.begin_capture().unwrap();
        flow.capture_succeeded(CapturedImage {
            bytes: vec![1, 2, 3],
            preview_url: "data:image/jpeg;base64,AQID".to_string(),
            width: 1,
            height: 1,
        })
        .unwrap();
    }

    fn fixed_id() -> ObservationId {
        ObservationId::parse("20240115T101530_ab12").unwrap()
    }

    #[test]
    fn test_initial_view() {
        let view = streaming_flow().view();
        assert_eq!(view.step_label, "Step 1 of 3");
        assert_eq!(view.instructions, "Take a photo of the object");
        assert_eq!(view.observation, "Not started");
        assert_eq!(view.progress_percent(), 0);
        assert!(view.controls.capture);
        assert!(!view.controls.save);
        assert!(!view.controls.cancel);
        assert!(!view.controls.start_new);
    }

    #[test]
    fn test_view_before_camera() {
        let view = CaptureFlow::new().view();
        assert!(!view.controls.capture);
        assert_eq!(view.state, FlowState::Initializing);
    }

    #[test]
    fn test_preview_controls() {
        let mut flow = streaming_flow();
        capture(&mut flow);
        let view = flow.view();
        assert!(view.controls.save);
        assert!(view.controls.retake);
        assert!(!view.controls.capture);
        assert_eq!(view.preview_url.as_deref(), Some("data:image/jpeg;base64,AQID"));
    }

    #[test]
    fn test_controls_disabled_while_saving() {
        let mut flow = streaming_flow();
        capture(&mut flow);
        flow.begin_save_with(fixed_id).unwrap();
        assert_eq!(flow.in_flight(), Some(Operation::Save));
        assert_eq!(flow.view().controls, Controls::default());
    }

    #[test]
    fn test_progress_and_labels_through_completion() {
        let mut flow = streaming_flow();
        let expected = [33, 67, 100];
        for percent in expected {
            capture(&mut flow);
            flow.begin_save_with(fixed_id).unwrap();
            flow.save_succeeded().unwrap();
            assert_eq!(flow.view().progress_percent(), percent);
        }
        let view = flow.view();
        assert_eq!(view.step_label, COMPLETE_LABEL);
        assert_eq!(view.instructions, COMPLETE_INSTRUCTIONS);
        assert_eq!(view.observation, "20240115T101530_ab12");
        assert!(view.controls.start_new);
        assert!(view.controls.cancel);
        assert!(!view.controls.capture);
    }

    #[test]
    fn test_canceled_label() {
        let mut flow = streaming_flow();
        capture(&mut flow);
        flow.begin_save_with(fixed_id).unwrap();
        flow.save_succeeded().unwrap();
        flow.begin_cancel().unwrap();
        flow.cancel_succeeded().unwrap();
        let view = flow.view();
        assert_eq!(view.observation, "Canceled");
        assert_eq!(view.step_label, "Step 1 of 3");
        assert!(!view.controls.cancel);
    }
}
