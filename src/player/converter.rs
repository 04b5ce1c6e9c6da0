use crate::core::{PlayerError, Result};
use crate::player::decoder::RawFrame;
use crate::player::frame_pool::DisplayFrame;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::format::Pixel;
use log::debug;

/// 像素格式转换器（尺寸不变，只转换像素布局）
pub struct ColorConverter {
    scaler: scaling::Context,
    dst: Pixel,
    width: u32,
    height: u32,
    /// 常驻输出缓冲：首次 convert 时分配，之后每帧覆盖
    standing: Option<DisplayFrame>,
}

impl ColorConverter {
    pub fn create(src: Pixel, dst: Pixel, width: u32, height: u32) -> Result<Self> {
        debug!("创建像素转换器: {:?} -> {:?} ({}x{})", src, dst, width, height);

        let scaler = scaling::Context::get(
            src,
            width,
            height,
            dst,
            width,
            height,
            scaling::Flags::BICUBIC,
        )
        .map_err(PlayerError::Convert)?;

        Ok(Self {
            scaler,
            dst,
            width,
            height,
            standing: None,
        })
    }

    /// 转换到常驻缓冲并返回其引用
    pub fn convert(&mut self, raw: &RawFrame) -> Result<&DisplayFrame> {
        let frame = match self.standing.take() {
            Some(frame) => frame,
            None => DisplayFrame::alloc(self.dst, self.width, self.height)?,
        };
        let standing = self.standing.insert(frame);

        self.scaler
            .run(&raw.frame, standing.as_video_mut())
            .map_err(PlayerError::Convert)?;
        standing.set_picture_number(raw.picture_number);
        Ok(standing)
    }

    /// 转换到调用方提供的缓冲（缓冲池中的帧）
    pub fn convert_into(&mut self, raw: &RawFrame, dst: &mut DisplayFrame) -> Result<()> {
        self.scaler
            .run(&raw.frame, dst.as_video_mut())
            .map_err(PlayerError::Convert)?;
        dst.set_picture_number(raw.picture_number);
        Ok(())
    }
}
