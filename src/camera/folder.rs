//! 画像フォルダをカメラとして扱う
//!
//! フォルダ内の静止画をファイル名順に1枚ずつ返す（最後まで行ったら先頭に戻る）。
//! `environment/` や `user/` サブフォルダがあれば向きの希望に合わせて使う。

use super::{Camera, CameraError, FacingMode, StreamInfo};
use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub struct FolderCamera {
    root: PathBuf,
    frames: Vec<PathBuf>,
    cursor: usize,
    streaming: bool,
}

impl FolderCamera {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            frames: Vec::new(),
            cursor: 0,
            streaming: false,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// 向きのサブフォルダに画像があればそちら、なければルートを使う
    fn resolve_frames(
        &self,
        facing: FacingMode,
    ) -> Result<(PathBuf, Vec<PathBuf>, Option<FacingMode>), CameraError> {
        let preferred = self.root.join(facing.as_str());
        if preferred.is_dir() {
            let frames = list_frames(&preferred)?;
            if !frames.is_empty() {
                return Ok((preferred, frames, Some(facing)));
            }
            tracing::debug!(dir = %preferred.display(), "facing folder is empty, using root");
        }
        let frames = list_frames(&self.root)?;
        Ok((self.root.clone(), frames, None))
    }
}

fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, CameraError> {
    // 権限エラーを区別するため先にread_dirで確認
    if let Err(e) = std::fs::read_dir(dir) {
        return Err(match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                CameraError::PermissionDenied(dir.display().to_string())
            }
            _ => CameraError::NoDevice(dir.display().to_string()),
        });
    }

    let mut frames: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .map(|ext| FRAME_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false)
        })
        .collect();

    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

#[async_trait]
impl Camera for FolderCamera {
    async fn open(&mut self, facing: FacingMode) -> Result<StreamInfo, CameraError> {
        if self.streaming {
            return Err(CameraError::DeviceBusy);
        }
        if !self.root.is_dir() {
            return Err(CameraError::NoDevice(self.root.display().to_string()));
        }

        let (dir, frames, matched) = self.resolve_frames(facing)?;
        if frames.is_empty() {
            return Err(CameraError::NoDevice(format!(
                "{} に画像がありません",
                dir.display()
            )));
        }

        tracing::debug!(dir = %dir.display(), frames = frames.len(), "frame folder opened");
        self.frames = frames;
        self.cursor = 0;
        self.streaming = true;

        Ok(StreamInfo {
            source: dir.display().to_string(),
            facing: matched,
        })
    }

    async fn grab_frame(&mut self) -> Result<RgbImage, CameraError> {
        if !self.streaming || self.frames.is_empty() {
            return Err(CameraError::NotStreaming);
        }

        let path = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();

        tokio::task::spawn_blocking(move || {
            image::open(&path)
                .map(|img| img.to_rgb8())
                .map_err(|e| CameraError::Frame(format!("{}: {}", path.display(), e)))
        })
        .await
        .map_err(|e| CameraError::Frame(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_frames_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("a.PNG"), b"x").unwrap();
        fs::write(dir.path().join("c.Jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.jpg"), b"x").unwrap();

        let frames = list_frames(dir.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg", "c.Jpg"]);
    }

    #[test]
    fn test_list_frames_missing_dir() {
        let result = list_frames(Path::new("/nonexistent/frames/12345"));
        assert!(matches!(result, Err(CameraError::NoDevice(_))));
    }

    #[test]
    fn test_resolve_frames_prefers_facing_subfolder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("root.jpg"), b"x").unwrap();
        fs::create_dir(dir.path().join("user")).unwrap();
        fs::write(dir.path().join("user").join("front.jpg"), b"x").unwrap();
        let camera = FolderCamera::new(dir.path());

        let (path, frames, matched) = camera.resolve_frames(FacingMode::User).unwrap();
        assert_eq!(path, dir.path().join("user"));
        assert_eq!(frames.len(), 1);
        assert_eq!(matched, Some(FacingMode::User));

        let (path, _, matched) = camera.resolve_frames(FacingMode::Environment).unwrap();
        assert_eq!(path, dir.path());
        assert_eq!(matched, None);
    }

    /// 向きのサブフォルダが空ならルートにフォールバック
    #[test]
    fn test_resolve_frames_falls_back_from_empty_subfolder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("root.jpg"), b"x").unwrap();
        fs::create_dir(dir.path().join("environment")).unwrap();
        fs::write(dir.path().join("environment").join("readme.txt"), b"x").unwrap();
        let camera = FolderCamera::new(dir.path());

        let (path, frames, matched) = camera.resolve_frames(FacingMode::Environment).unwrap();
        assert_eq!(path, dir.path());
        assert_eq!(frames, vec![dir.path().join("root.jpg")]);
        assert_eq!(matched, None);
    }
}
