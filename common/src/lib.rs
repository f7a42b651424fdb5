//! Photo Capture Common Library
//!
//! 撮影フローの状態機械と共有型（I/Oなし）

pub mod error;
pub mod flow;
pub mod observation;
pub mod step;
pub mod view;

pub use error::{FlowError, Result};
pub use flow::{
    CaptureFlow, CapturedImage, FlowState, MessageTone, ObservationLabel, Operation,
    SaveRequest, StatusMessage, NEW_OBSERVATION_KEY,
};
pub use observation::ObservationId;
pub use step::CaptureStep;
pub use view::{Controls, FlowView};
