use crate::core::{PlayerError, Result, StreamInfo};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::{codec, util, Packet};
use log::{debug, info};

/// 解码输出的原始帧
pub struct RawFrame {
    pub frame: util::frame::Video,
    /// 解码器输出序号（从 0 开始，按输出顺序递增）
    pub picture_number: u64,
}

/// 解码器抽象接口
///
/// 每次 submit 之后调用方需要反复 receive 直到返回 None，再读取下一个包。
pub trait FrameDecoder {
    /// 提交一个数据包，解码器拒绝时返回错误（不致命）
    fn submit(&mut self, packet: &Packet) -> Result<()>;

    /// 取出一帧；Ok(None) 表示暂时没有可用帧，不是错误
    fn receive(&mut self) -> Result<Option<RawFrame>>;

    /// 通知解码器输入结束，之后可继续 receive 取出缓冲帧
    fn finish(&mut self) -> Result<()>;
}

/// 视频解码器
pub struct Decoder {
    decoder: codec::decoder::Video,
    pictures: u64,
}

impl Decoder {
    /// 根据流参数打开解码器
    pub fn open(parameters: codec::Parameters, stream: &StreamInfo) -> Result<Self> {
        info!("创建视频解码器: 流 #{} ({})", stream.index, stream.codec);

        let context = codec::context::Context::from_parameters(parameters)
            .map_err(PlayerError::ParamBindFailed)?;

        let codec = ffmpeg::decoder::find(context.id())
            .ok_or_else(|| PlayerError::UnsupportedCodec(stream.codec.clone()))?;

        let decoder = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.video())
            .map_err(PlayerError::DecoderOpenFailed)?;

        debug!(
            "解码器: {} {}x{}, 格式: {:?}",
            codec.name(),
            decoder.width(),
            decoder.height(),
            decoder.format()
        );

        Ok(Self {
            decoder,
            pictures: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    pub fn format(&self) -> util::format::Pixel {
        self.decoder.format()
    }
}

impl FrameDecoder for Decoder {
    fn submit(&mut self, packet: &Packet) -> Result<()> {
        self.decoder.send_packet(packet).map_err(PlayerError::Decode)
    }

    fn receive(&mut self) -> Result<Option<RawFrame>> {
        let mut frame = util::frame::Video::empty();
        match self.decoder.receive_frame(&mut frame) {
            Ok(()) => {
                let picture_number = self.pictures;
                self.pictures += 1;
                Ok(Some(RawFrame {
                    frame,
                    picture_number,
                }))
            }
            Err(ffmpeg::Error::Other { errno: 11 }) => Ok(None), // EAGAIN
            Err(ffmpeg::Error::Eof) => Ok(None),
            Err(e) => Err(PlayerError::Decode(e)),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.decoder.send_eof().map_err(PlayerError::Decode)
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        debug!("释放解码器（共输出 {} 帧）", self.pictures);
    }
}
