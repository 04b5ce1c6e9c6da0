use std::path::PathBuf;
use thiserror::Error;

use crate::core::MediaKind;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("文件不存在: {}", .0.display())]
    NotFound(PathBuf),

    #[error("无法打开文件: {0}")]
    OpenFailed(#[source] ffmpeg_next::Error),

    #[error("文件中没有可用的流信息")]
    NoStreamInfo,

    #[error("无法找到{0}流")]
    NoSuchStream(MediaKind),

    #[error("内存分配失败: {0}")]
    AllocFailed(String),

    #[error("解码参数绑定失败: {0}")]
    ParamBindFailed(#[source] ffmpeg_next::Error),

    #[error("不支持的编解码器: {0}")]
    UnsupportedCodec(String),

    #[error("解码器打开失败: {0}")]
    DecoderOpenFailed(#[source] ffmpeg_next::Error),

    #[error("读取数据包失败: {0}")]
    ReadFailed(#[source] ffmpeg_next::Error),

    #[error("解码错误: {0}")]
    Decode(#[source] ffmpeg_next::Error),

    #[error("像素格式转换失败: {0}")]
    Convert(#[source] ffmpeg_next::Error),

    #[error("渲染错误: {0}")]
    RenderError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),
}

impl PlayerError {
    /// 启动阶段错误：在任何工作线程启动之前终止
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            PlayerError::NotFound(_)
                | PlayerError::OpenFailed(_)
                | PlayerError::NoStreamInfo
                | PlayerError::NoSuchStream(_)
                | PlayerError::AllocFailed(_)
                | PlayerError::ParamBindFailed(_)
                | PlayerError::UnsupportedCodec(_)
                | PlayerError::DecoderOpenFailed(_)
        )
    }

    /// 进程退出码：FFmpeg 错误直接返回库的错误码，其余返回 -1
    pub fn exit_code(&self) -> i32 {
        match self {
            PlayerError::OpenFailed(e)
            | PlayerError::ParamBindFailed(e)
            | PlayerError::DecoderOpenFailed(e)
            | PlayerError::ReadFailed(e)
            | PlayerError::Decode(e)
            | PlayerError::Convert(e) => i32::from(*e),
            _ => -1,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
