use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 定速播放（窗口显示）
    Play,
    /// 抽帧保存为 PPM
    Dump,
}

/// 播放器配置
///
/// 优先级：内置默认值 < JSON 配置文件 < 命令行参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub input: PathBuf,
    pub mode: Mode,
    /// 抽帧间隔：解码序号能被整除时保存
    pub sample_every: u64,
    pub output_dir: PathBuf,
    /// 显示帧缓冲数量，1 表示严格背压
    pub frame_pool_size: usize,
    pub headless: bool,
    /// 流中没有平均帧率时使用
    pub fallback_fps: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("../input.mp4"),
            mode: Mode::Play,
            sample_every: 100,
            output_dir: PathBuf::from("."),
            frame_pool_size: 2,
            headless: false,
            fallback_fps: 25.0,
        }
    }
}

impl PlayerConfig {
    /// 从 JSON 文件加载，缺失字段使用默认值
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.sample_every > 0, "sample_every 必须大于 0");
        anyhow::ensure!(self.frame_pool_size > 0, "frame_pool_size 必须大于 0");
        anyhow::ensure!(
            self.fallback_fps.is_finite() && self.fallback_fps > 0.0,
            "fallback_fps 必须为正数"
        );
        Ok(())
    }
}
