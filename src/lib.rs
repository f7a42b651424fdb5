//! photo-capture
//!
//! 対象物・秤に載せた対象物・秤の表示値の3枚を順に撮影し、観測IDを付けてアップロードする。

pub mod backend;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controller;
pub mod encoder;
pub mod error;
pub mod session;

pub use photo_capture_common as common;
