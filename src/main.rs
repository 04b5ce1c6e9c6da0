use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process;

mod app;
mod core;
mod player;
mod renderer;

use crate::core::{Mode, PlayerConfig, PlayerError};

/// 视频解码与逐帧显示工具
#[derive(Parser)]
#[command(name = "vidpump", version, about = "视频解码与逐帧显示工具")]
struct Cli {
    /// 输入媒体文件（默认 ../input.mp4）
    input: Option<PathBuf>,

    /// 运行模式
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// 抽帧间隔（dump 模式）
    #[arg(long)]
    every: Option<u64>,

    /// PPM 输出目录（dump 模式）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 不创建窗口（play 模式）
    #[arg(long)]
    headless: bool,

    /// 显示帧缓冲数量
    #[arg(long)]
    pool_size: Option<usize>,

    /// JSON 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 只输出媒体信息（JSON）
    #[arg(long)]
    probe: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// 合并配置：默认值 < 配置文件 < 命令行
    fn into_config(self) -> Result<PlayerConfig> {
        let mut config = match &self.config {
            Some(path) => PlayerConfig::load(path)?,
            None => PlayerConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(every) = self.every {
            config.sample_every = every;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(pool_size) = self.pool_size {
            config.frame_pool_size = pool_size;
        }
        config.headless |= self.headless;

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    // 初始化日志
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            match e.downcast_ref::<PlayerError>() {
                Some(err) if err.is_startup() => error!("❌ 启动失败: {:#}", e),
                _ => error!("❌ {:#}", e),
            }
            e.downcast_ref::<PlayerError>()
                .map(PlayerError::exit_code)
                .unwrap_or(-1)
        }
    };

    process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let probe = cli.probe;
    let config = cli.into_config()?;

    // 初始化 FFmpeg
    ffmpeg_next::init().map_err(|e| anyhow::anyhow!("FFmpeg 初始化失败: {}", e))?;
    info!("✅ FFmpeg 初始化成功");

    if probe {
        let media_info = app::probe(&config.input)?;
        println!("{}", serde_json::to_string_pretty(&media_info)?);
        return Ok(());
    }

    info!(
        "🎬 vidpump 启动: {} ({})",
        config.input.display(),
        match config.mode {
            Mode::Play => "play",
            Mode::Dump => "dump",
        }
    );

    app::run(&config)?;
    Ok(())
}
