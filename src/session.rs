//! 対話式撮影セッション（端末UI）
//!
//! 入力をコントローラの操作に変換し、`FlowView` を表示するだけの薄い層。

use crate::backend::ObservationBackend;
use crate::camera::Camera;
use crate::controller::CaptureController;
use crate::encoder;
use crate::error::{CaptureError, Result};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use photo_capture_common::{Controls, FlowState, FlowView, MessageTone, NEW_OBSERVATION_KEY};
use std::path::Path;

/// プレビュー画像の書き出しファイル名（撮影のたびに上書き）
pub const PREVIEW_FILE_NAME: &str = "photo-capture-preview.jpg";

/// 入力から決まる操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Capture,
    Save,
    Retake,
    Cancel,
    /// ショートカットキー（完了時の `n`）
    Key(char),
    Quit,
    /// 何もしない（Enterのみで既定操作がない等）
    Idle,
    Unknown(String),
}

/// 入力文字列を操作に変換
///
/// Enterのみの場合は状態に応じた既定操作（撮影待ち→撮影、プレビュー→保存）。
pub fn parse_action(input: &str, controls: &Controls) -> SessionAction {
    let trimmed = input.trim();
    match trimmed {
        "" if controls.capture => SessionAction::Capture,
        "" if controls.save => SessionAction::Save,
        "" => SessionAction::Idle,
        "c" | "C" => SessionAction::Capture,
        "s" | "S" => SessionAction::Save,
        "r" | "R" => SessionAction::Retake,
        "x" | "X" => SessionAction::Cancel,
        "q" | "Q" => SessionAction::Quit,
        _ => {
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) if key == NEW_OBSERVATION_KEY => SessionAction::Key(key),
                _ => SessionAction::Unknown(trimmed.to_string()),
            }
        }
    }
}

/// 今押せる操作の一覧
pub fn command_hints(controls: &Controls) -> String {
    let mut hints = Vec::new();
    if controls.capture {
        hints.push("c:capture");
    }
    if controls.save {
        hints.push("s:save");
    }
    if controls.retake {
        hints.push("r:retake");
    }
    if controls.cancel {
        hints.push("x:cancel");
    }
    if controls.start_new {
        hints.push("n:new observation");
    }
    hints.push("q:quit");
    hints.join(" ")
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("[{bar:30.green/white}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}

/// プレビュー中ならJPEGを `dir` に書き出し、表示する1行を返す
pub fn preview_line(view: &FlowView, dir: &Path) -> Result<Option<String>> {
    let Some(url) = view.preview_url.as_deref() else {
        return Ok(None);
    };
    let path = dir.join(PREVIEW_FILE_NAME);
    std::fs::write(&path, encoder::decode_data_url(url)?)?;
    Ok(Some(format!("  Preview: {}", path.display())))
}

fn render(view: &FlowView, bar: &ProgressBar) {
    bar.set_position(view.progress_percent() as u64);
    bar.set_message(format!("{} | Observation: {}", view.step_label, view.observation));

    bar.println(format!("\n📷 {}", view.instructions));
    if let Some(message) = &view.message {
        let mark = match message.tone {
            MessageTone::Success => "✔",
            MessageTone::Error => "✘",
            MessageTone::Info => "-",
        };
        bar.println(format!("{} {}", mark, message.text));
    }
}

/// 対話ループ。カメラが使えなければメッセージを出して終了
pub async fn run<C, B>(controller: &mut CaptureController<C, B>) -> Result<()>
where
    C: Camera,
    B: ObservationBackend,
{
    controller.initialize().await?;
    let bar = progress_bar();
    let preview_dir = std::env::temp_dir();

    loop {
        let view = controller.view();
        render(&view, &bar);

        if view.state == FlowState::CameraUnavailable {
            bar.abandon();
            return Ok(());
        }

        match preview_line(&view, &preview_dir) {
            Ok(Some(line)) => bar.println(line),
            Ok(None) => {}
            Err(e) => bar.println(format!("✘ {}", e)),
        }

        let prompt = command_hints(&view.controls);
        let input: String = bar
            .suspend(|| {
                Input::new()
                    .with_prompt(prompt)
                    .allow_empty(true)
                    .interact_text()
            })
            .map_err(|e| CaptureError::Prompt(e.to_string()))?;

        let outcome = match parse_action(&input, &view.controls) {
            SessionAction::Capture => controller.capture_frame().await,
            SessionAction::Save => controller.save_capture().await,
            SessionAction::Retake => controller.retake(),
            SessionAction::Cancel => controller.cancel_observation().await,
            SessionAction::Key(key) => {
                if !controller.handle_key(key) {
                    bar.println("  (available once all photos are captured)");
                }
                Ok(())
            }
            SessionAction::Quit => break,
            SessionAction::Idle => Ok(()),
            SessionAction::Unknown(command) => {
                bar.println(format!("  Unknown command: {}", command));
                Ok(())
            }
        };

        if let Err(e) = outcome {
            bar.println(format!("✘ {}", e));
        }
    }

    bar.finish_and_clear();
    Ok(())
}
