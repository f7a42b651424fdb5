use clap::Parser;
use photo_capture::backend::{HttpBackend, ObservationBackend};
use photo_capture::camera::FolderCamera;
use photo_capture::cli::{Cli, Commands};
use photo_capture::config::Config;
use photo_capture::controller::CaptureController;
use photo_capture::error::{CaptureError, Result};
use photo_capture::session;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Capture { frames, server, facing } => {
            println!("📸 photo-capture - 撮影\n");

            let frames_dir = frames.or_else(|| config.frames_dir.clone()).ok_or_else(|| {
                CaptureError::Config(
                    "カメラ画像フォルダが未設定です。--frames を指定するか `photo-capture config --set-frames DIR` で設定してください"
                        .into(),
                )
            })?;
            let server_url = server.unwrap_or_else(|| config.server_url());

            let backend = HttpBackend::new(server_url)?;
            println!("- 保存先: {}", backend.base_url());
            println!("- カメラ: {}\n", frames_dir.display());

            let camera = FolderCamera::new(frames_dir);
            let mut controller =
                CaptureController::new(camera, backend, config.controller_settings(facing));

            session::run(&mut controller).await?;

            println!("\n✅ 終了");
        }

        Commands::Health { server } => {
            let server_url = server.unwrap_or_else(|| config.server_url());
            let backend = HttpBackend::new(server_url)?;
            backend.health().await?;
            println!("✔ 保存先サーバーに接続できました: {}", backend.base_url());
        }

        Commands::Config { set_server, set_frames, show } => {
            let mut config = config;

            if let Some(url) = set_server {
                config.set_server_url(url)?;
                println!("✔ 保存先サーバーを設定しました");
            }

            if let Some(dir) = set_frames {
                config.set_frames_dir(dir)?;
                println!("✔ カメラ画像フォルダを設定しました");
            }

            if show {
                println!("設定:");
                println!("  サーバー: {}", config.server_url());
                println!("  カメラの向き: {}", config.facing_mode);
                println!("  JPEG品質: {} (プレビュー {})", config.jpeg_quality, config.preview_quality);
                println!(
                    "  画像フォルダ: {}",
                    config
                        .frames_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
            }
        }
    }

    Ok(())
}
