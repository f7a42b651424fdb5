use crate::camera::FacingMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-capture")]
#[command(about = "Guided capture of object, scale and scale reading photos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話式で1観測分（3枚）を撮影してアップロード
    Capture {
        /// カメラとして使う画像フォルダ（省略時は設定値）
        #[arg(short, long)]
        frames: Option<PathBuf>,

        /// 保存先サーバーURL
        #[arg(short, long)]
        server: Option<String>,

        /// カメラの向き (environment/user)
        #[arg(long)]
        facing: Option<FacingMode>,
    },

    /// サーバーの死活確認
    Health {
        /// 保存先サーバーURL
        #[arg(short, long)]
        server: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 保存先サーバーURLを設定
        #[arg(long)]
        set_server: Option<String>,

        /// カメラ画像フォルダを設定
        #[arg(long)]
        set_frames: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
