use crate::core::{select_first, MediaInfo, MediaKind, PlayerError, Result, StreamInfo};
use crate::player::packet_source::PacketSource;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::{codec, format, Packet};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// 媒体容器 - 打开一次，drop 时关闭
pub struct Container {
    input: format::context::Input,
    path: PathBuf,
    streams: Vec<StreamInfo>,
}

impl Container {
    /// 打开媒体文件
    ///
    /// 文件不存在时直接返回 NotFound，不分配任何解码资源
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlayerError::NotFound(path.to_path_buf()));
        }

        info!("正在打开文件: {}", path.display());

        // format::input 内部完成 avformat_open_input + avformat_find_stream_info
        let input = format::input(&path).map_err(PlayerError::OpenFailed)?;

        let streams: Vec<StreamInfo> = input.streams().map(|s| Self::describe(&s)).collect();
        if streams.is_empty() {
            return Err(PlayerError::NoStreamInfo);
        }

        for s in &streams {
            debug!(
                "流 #{}: {} {} {}x{} @ {}/{}",
                s.index, s.kind, s.codec, s.width, s.height, s.avg_frame_rate.0, s.avg_frame_rate.1
            );
        }

        Ok(Self {
            input,
            path: path.to_path_buf(),
            streams,
        })
    }

    fn describe(stream: &format::stream::Stream) -> StreamInfo {
        let parameters = stream.parameters();
        let kind = MediaKind::from(parameters.medium());
        let codec = parameters.id().name().to_string();

        // codecpar 中直接读取宽高，避免为了取尺寸而打开解码器
        let (width, height) = unsafe {
            let raw = parameters.as_ptr();
            ((*raw).width.max(0) as u32, (*raw).height.max(0) as u32)
        };

        let rate = stream.avg_frame_rate();

        StreamInfo {
            index: stream.index(),
            kind,
            codec,
            width,
            height,
            avg_frame_rate: (rate.numerator(), rate.denominator()),
        }
    }

    /// 所有流（按容器中的顺序）
    pub fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    /// 选择第一个指定类型的流
    pub fn select_stream(&self, kind: MediaKind) -> Result<StreamInfo> {
        let stream = select_first(&self.streams, kind)?;
        info!("选择{}流: #{} ({})", kind, stream.index, stream.codec);
        Ok(stream.clone())
    }

    /// 获取流的编解码参数（用于打开解码器）
    pub fn parameters(&self, stream: &StreamInfo) -> Result<codec::Parameters> {
        self.input
            .stream(stream.index)
            .map(|s| s.parameters())
            .ok_or(PlayerError::NoSuchStream(stream.kind))
    }

    /// 输出文件流信息（等同 av_dump_format）
    pub fn dump(&self) {
        let url = self.path.to_string_lossy();
        format::context::input::dump(&self.input, 0, Some(url.as_ref()));
    }

    /// 媒体信息摘要
    pub fn media_info(&self) -> MediaInfo {
        let duration = self.input.duration();
        MediaInfo {
            source: self.path.display().to_string(),
            format: self.input.format().name().to_string(),
            // AV_NOPTS_VALUE 表示时长未知
            duration_ms: if duration < 0 { -1 } else { duration / 1000 },
            streams: self.streams.clone(),
        }
    }
}

impl PacketSource for Container {
    fn read_packet(&mut self) -> Result<Option<Packet>> {
        let mut packet = Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => Ok(Some(packet)),
            Err(ffmpeg::Error::Eof) => Ok(None),
            Err(e) => Err(PlayerError::ReadFailed(e)),
        }
    }

    fn description(&self) -> String {
        format!("FFmpeg 容器: {}", self.path.display())
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        debug!("关闭容器: {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.mp4");
        match Container::open(&path) {
            Err(PlayerError::NotFound(p)) => assert_eq!(p, path),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("missing file opened"),
        }
    }

    #[test]
    fn test_garbage_file_fails_to_open() {
        ffmpeg::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.dat");
        std::fs::write(&path, b"definitely not a media container").unwrap();

        let err = Container::open(&path).err().expect("garbage opened");
        assert!(err.is_startup());
        assert!(!matches!(err, PlayerError::NotFound(_)));
    }

    #[test]
    fn test_encoded_clip_streams() {
        use crate::player::test_media::{write_video_clip, CLIP_HEIGHT, CLIP_WIDTH};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.avi");
        write_video_clip(&path, 10, 25);

        let container = Container::open(&path).unwrap();
        let video = container.select_stream(MediaKind::Video).unwrap();
        assert_eq!(video.index, 0);
        assert_eq!((video.width, video.height), (CLIP_WIDTH, CLIP_HEIGHT));
        assert_eq!(video.codec, "mpeg4");
        assert!(matches!(
            container.select_stream(MediaKind::Audio),
            Err(PlayerError::NoSuchStream(MediaKind::Audio))
        ));

        let info = container.media_info();
        assert_eq!(info.format, "avi");
        assert_eq!(info.streams.len(), 1);
    }
}
