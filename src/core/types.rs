use ffmpeg_next::media;
use serde::Serialize;
use std::fmt;

use crate::core::{PlayerError, Result};

/// 媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Other,
}

impl From<media::Type> for MediaKind {
    fn from(ty: media::Type) -> Self {
        match ty {
            media::Type::Video => MediaKind::Video,
            media::Type::Audio => MediaKind::Audio,
            media::Type::Subtitle => MediaKind::Subtitle,
            media::Type::Data => MediaKind::Data,
            _ => MediaKind::Other,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Video => "视频",
            MediaKind::Audio => "音频",
            MediaKind::Subtitle => "字幕",
            MediaKind::Data => "数据",
            MediaKind::Other => "未知",
        };
        f.write_str(name)
    }
}

/// 流元数据（打开容器后不再变化）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    pub index: usize,
    pub kind: MediaKind,
    pub codec: String,
    pub width: u32,
    pub height: u32,
    /// 平均帧率（分子, 分母），0/0 表示未知
    pub avg_frame_rate: (i32, i32),
}

impl StreamInfo {
    /// 平均帧率，未知或非法时返回 None
    pub fn fps(&self) -> Option<f64> {
        let (num, den) = self.avg_frame_rate;
        if num <= 0 || den <= 0 {
            return None;
        }
        let fps = num as f64 / den as f64;
        fps.is_finite().then_some(fps)
    }
}

/// 按流顺序选取第一个指定类型的流
pub fn select_first(streams: &[StreamInfo], kind: MediaKind) -> Result<&StreamInfo> {
    streams
        .iter()
        .find(|s| s.kind == kind)
        .ok_or(PlayerError::NoSuchStream(kind))
}

/// 媒体信息（--probe 输出）
#[derive(Debug, Clone, Serialize)]
pub struct MediaInfo {
    pub source: String,
    pub format: String,
    pub duration_ms: i64,
    pub streams: Vec<StreamInfo>,
}

/// 工作线程退出报告
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// 线程返回码，0 表示正常退出
    pub status: i32,
    /// 处理过的信号数（不含 Shutdown）
    pub handled: u64,
}

impl WorkerReport {
    pub fn failed() -> Self {
        Self {
            status: -1,
            handled: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(index: usize, kind: MediaKind) -> StreamInfo {
        StreamInfo {
            index,
            kind,
            codec: "test".into(),
            width: 0,
            height: 0,
            avg_frame_rate: (0, 0),
        }
    }

    #[test]
    fn test_select_first_in_stream_order() {
        let streams = vec![
            stream(0, MediaKind::Audio),
            stream(1, MediaKind::Video),
            stream(2, MediaKind::Video),
        ];
        assert_eq!(select_first(&streams, MediaKind::Video).unwrap().index, 1);
        assert_eq!(select_first(&streams, MediaKind::Audio).unwrap().index, 0);
    }

    #[test]
    fn test_audio_only_has_no_video() {
        let streams = vec![stream(0, MediaKind::Audio)];
        match select_first(&streams, MediaKind::Video) {
            Err(PlayerError::NoSuchStream(MediaKind::Video)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_fps() {
        let mut s = stream(0, MediaKind::Video);
        s.avg_frame_rate = (25, 1);
        assert_eq!(s.fps(), Some(25.0));
        s.avg_frame_rate = (30000, 1001);
        assert!((s.fps().unwrap() - 29.97).abs() < 0.01);
        s.avg_frame_rate = (0, 0);
        assert_eq!(s.fps(), None);
    }
}
