//! 撮影ステップ定義
//!
//! 撮影順は固定: 対象物 → 秤に載せた対象物 → 秤の表示値

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1回の観測で必要な写真の種類
///
/// 列挙順がそのまま撮影順になる（`Ord` も同じ順序）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStep {
    Object,
    Scale,
    ScaleReading,
}

impl CaptureStep {
    /// 撮影順に並べた全ステップ
    pub const ALL: [CaptureStep; 3] = [
        CaptureStep::Object,
        CaptureStep::Scale,
        CaptureStep::ScaleReading,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// 送信時のフォーム値
    pub fn key(&self) -> &'static str {
        match self {
            CaptureStep::Object => "object",
            CaptureStep::Scale => "scale",
            CaptureStep::ScaleReading => "scale_reading",
        }
    }

    /// 画面に表示する撮影指示
    pub fn label(&self) -> &'static str {
        match self {
            CaptureStep::Object => "Take a photo of the object",
            CaptureStep::Scale => "Take a photo of the object on the scale",
            CaptureStep::ScaleReading => "Take a photo of the scale reading",
        }
    }

    /// 0始まりの撮影順
    pub fn position(&self) -> usize {
        match self {
            CaptureStep::Object => 0,
            CaptureStep::Scale => 1,
            CaptureStep::ScaleReading => 2,
        }
    }

    pub fn at(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 次のステップ（最後ならNone）
    pub fn next(&self) -> Option<Self> {
        Self::at(self.position() + 1)
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.key() == key.trim())
            .ok_or_else(|| FlowError::UnknownStep(key.to_string()))
    }
}

impl fmt::Display for CaptureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CaptureStep {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matches_position() {
        for (index, step) in CaptureStep::ALL.iter().enumerate() {
            assert_eq!(step.position(), index);
            assert_eq!(CaptureStep::at(index), Some(*step));
        }
        assert!(CaptureStep::Object < CaptureStep::Scale);
        assert!(CaptureStep::Scale < CaptureStep::ScaleReading);
    }

    #[test]
    fn test_next_walks_the_sequence() {
        assert_eq!(CaptureStep::Object.next(), Some(CaptureStep::Scale));
        assert_eq!(CaptureStep::Scale.next(), Some(CaptureStep::ScaleReading));
        assert_eq!(CaptureStep::ScaleReading.next(), None);
        assert!(CaptureStep::ScaleReading.is_last());
        assert_eq!(CaptureStep::at(CaptureStep::COUNT), None);
    }

    #[test]
    fn test_from_key() {
        assert_eq!(CaptureStep::from_key("object").unwrap(), CaptureStep::Object);
        assert_eq!(CaptureStep::from_key(" scale ").unwrap(), CaptureStep::Scale);
        assert_eq!(
            "scale_reading".parse::<CaptureStep>().unwrap(),
            CaptureStep::ScaleReading
        );
        assert!(matches!(
            CaptureStep::from_key("Object"),
            Err(FlowError::UnknownStep(_))
        ));
        assert!(CaptureStep::from_key("").is_err());
    }

    #[test]
    fn test_serde_uses_key() {
        let json = serde_json::to_string(&CaptureStep::ScaleReading).unwrap();
        assert_eq!(json, "\"scale_reading\"");
        let step: CaptureStep = serde_json::from_str("\"scale\"").unwrap();
        assert_eq!(step, CaptureStep::Scale);
    }

    #[test]
    fn test_display_is_key() {
        assert_eq!(CaptureStep::Object.to_string(), "object");
    }
}
