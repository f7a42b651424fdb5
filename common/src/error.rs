//! エラー型定義

use thiserror::Error;

use crate::flow::Operation;

/// 撮影フローの遷移エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("{0} is already in progress")]
    Busy(Operation),

    #[error("unknown step: {0}")]
    UnknownStep(String),

    #[error("invalid observation id: {0:?}")]
    InvalidObservationId(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, FlowError>;
