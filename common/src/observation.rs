//! 観測ID
//!
//! `YYYYMMDDTHHMMSS_xxxx` 形式: 時刻部分でソート可能、末尾4文字はランダム英数字。
//! 同一秒内の衝突は防がない（必要ならサーバー側で採番する）。

use crate::error::{FlowError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
pub const SUFFIX_LEN: usize = 4;

/// サーバーに渡す観測識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationId(String);

impl ObservationId {
    /// 現在時刻とスレッドローカル乱数で生成
    pub fn generate() -> Self {
        Self::generate_at(Utc::now(), &mut rand::thread_rng())
    }

    pub fn generate_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self::from_parts(now, &suffix)
    }

    pub fn from_parts(timestamp: DateTime<Utc>, suffix: &str) -> Self {
        Self(format!("{}_{}", timestamp.format(TIMESTAMP_FORMAT), suffix))
    }

    /// 外部から受け取ったIDを検証（空文字は不可）
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FlowError::InvalidObservationId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObservationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
