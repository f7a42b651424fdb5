//! 画像フォルダカメラのテスト

use image::{Rgb, RgbImage};
use photo_capture::camera::{Camera, CameraError, FacingMode, FolderCamera};
use std::path::Path;
use tempfile::tempdir;

fn write_frame(dir: &Path, name: &str, width: u32, height: u32) {
    std::fs::create_dir_all(dir).unwrap();
    RgbImage::from_pixel(width, height, Rgb([10, 20, 30]))
        .save(dir.join(name))
        .unwrap();
}

/// フレームはファイル名順に返り、最後まで行くと先頭に戻る
#[tokio::test]
async fn test_frames_cycle_in_name_order() {
    let dir = tempdir().unwrap();
    write_frame(dir.path(), "2.png", 20, 10);
    write_frame(dir.path(), "1.png", 10, 5);

    let mut camera = FolderCamera::new(dir.path());
    let info = camera.open(FacingMode::Environment).await.unwrap();
    assert_eq!(info.facing, None);
    assert_eq!(camera.frame_count(), 2);

    let sizes: Vec<(u32, u32)> = [
        camera.grab_frame().await.unwrap(),
        camera.grab_frame().await.unwrap(),
        camera.grab_frame().await.unwrap(),
    ]
    .iter()
    .map(|f| f.dimensions())
    .collect();
    assert_eq!(sizes, vec![(10, 5), (20, 10), (10, 5)]);
}

/// 向きのサブフォルダがあればそちらを使う
#[tokio::test]
async fn test_facing_subfolder() {
    let dir = tempdir().unwrap();
    write_frame(dir.path(), "root.png", 4, 4);
    write_frame(&dir.path().join("environment"), "rear.png", 8, 6);

    let mut camera = FolderCamera::new(dir.path());
    let info = camera.open(FacingMode::Environment).await.unwrap();
    assert_eq!(info.facing, Some(FacingMode::Environment));
    assert_eq!(camera.grab_frame().await.unwrap().dimensions(), (8, 6));
}

/// 向きのサブフォルダが空ならルートの画像を使う
#[tokio::test]
async fn test_empty_facing_subfolder_falls_back_to_root() {
    let dir = tempdir().unwrap();
    write_frame(dir.path(), "root.Jpg", 4, 4);
    std::fs::create_dir(dir.path().join("environment")).unwrap();

    let mut camera = FolderCamera::new(dir.path());
    let info = camera.open(FacingMode::Environment).await.unwrap();
    assert_eq!(info.facing, None);
    assert_eq!(camera.frame_count(), 1);
    assert_eq!(camera.grab_frame().await.unwrap().dimensions(), (4, 4));
}

#[tokio::test]
async fn test_missing_folder_is_no_device() {
    let mut camera = FolderCamera::new("/nonexistent/camera/12345");
    let err = camera.open(FacingMode::Environment).await.unwrap_err();
    assert!(matches!(err, CameraError::NoDevice(_)));
}

#[tokio::test]
async fn test_empty_folder_is_no_device() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("readme.txt"), "no frames").unwrap();

    let mut camera = FolderCamera::new(dir.path());
    let err = camera.open(FacingMode::User).await.unwrap_err();
    assert!(matches!(err, CameraError::NoDevice(_)));
}

/// 2回目のopenは使用中エラー
#[tokio::test]
async fn test_second_open_is_busy() {
    let dir = tempdir().unwrap();
    write_frame(dir.path(), "a.png", 2, 2);

    let mut camera = FolderCamera::new(dir.path());
    camera.open(FacingMode::Environment).await.unwrap();
    let err = camera.open(FacingMode::Environment).await.unwrap_err();
    assert!(matches!(err, CameraError::DeviceBusy));
}

#[tokio::test]
async fn test_grab_before_open() {
    let dir = tempdir().unwrap();
    let mut camera = FolderCamera::new(dir.path());
    assert!(matches!(
        camera.grab_frame().await,
        Err(CameraError::NotStreaming)
    ));
}

/// 壊れた画像はフレームエラー
#[tokio::test]
async fn test_corrupt_frame() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("broken.jpg"), b"not a jpeg").unwrap();

    let mut camera = FolderCamera::new(dir.path());
    camera.open(FacingMode::Environment).await.unwrap();
    assert!(matches!(
        camera.grab_frame().await,
        Err(CameraError::Frame(_))
    ));
}
