use crate::camera::FacingMode;
use crate::controller::ControllerSettings;
use crate::encoder::{EncodeSettings, CAPTURE_QUALITY, PREVIEW_QUALITY};
use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const SERVER_ENV: &str = "PHOTO_CAPTURE_SERVER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub facing_mode: FacingMode,
    pub jpeg_quality: u8,
    pub preview_quality: u8,
    pub frames_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            facing_mode: FacingMode::Environment,
            jpeg_quality: CAPTURE_QUALITY,
            preview_quality: PREVIEW_QUALITY,
            frames_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CaptureError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-capture").join("config.json"))
    }

    /// 接続先URL（環境変数を優先）
    pub fn server_url(&self) -> String {
        match std::env::var(SERVER_ENV) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.server_url.clone(),
        }
    }

    pub fn set_server_url(&mut self, url: String) -> Result<()> {
        self.server_url = url;
        self.save()
    }

    pub fn set_frames_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.frames_dir = Some(dir);
        self.save()
    }

    pub fn controller_settings(&self, facing: Option<FacingMode>) -> ControllerSettings {
        ControllerSettings {
            facing: facing.unwrap_or(self.facing_mode),
            encode: EncodeSettings {
                capture_quality: self.jpeg_quality,
                preview_quality: self.preview_quality,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.facing_mode, FacingMode::Environment);
        assert_eq!(config.jpeg_quality, 92);
        assert_eq!(config.preview_quality, 90);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            server_url: "http://example.test:8080".into(),
            facing_mode: FacingMode::User,
            frames_dir: Some(PathBuf::from("/frames")),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"facing_mode": "user"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.facing_mode, FacingMode::User);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_controller_settings_override() {
        let config = Config::default();
        let settings = config.controller_settings(Some(FacingMode::User));
        assert_eq!(settings.facing, FacingMode::User);
        assert_eq!(settings.encode.capture_quality, 92);
    }
}
