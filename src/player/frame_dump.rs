use crate::core::{PlayerError, Result};
use crate::player::frame_pool::DisplayFrame;
use ffmpeg_next::util::format::Pixel;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 抽帧策略：解码序号能被 every 整除的帧被保存
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    every: u64,
}

impl SamplingPolicy {
    pub fn every(every: u64) -> Self {
        Self {
            every: every.max(1),
        }
    }

    pub fn should_save(&self, picture_number: u64) -> bool {
        picture_number % self.every == 0
    }
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self::every(100)
    }
}

/// 帧文件名：`<序号>.ppm`
pub fn frame_path(dir: &Path, picture_number: u64) -> PathBuf {
    dir.join(format!("{}.ppm", picture_number))
}

/// 写出二进制 PPM（P6）
///
/// 每行只写前 `width * 3` 字节，行尾填充不写出。
pub fn write_ppm<W: Write>(
    out: &mut W,
    width: u32,
    height: u32,
    stride: usize,
    data: &[u8],
) -> Result<()> {
    let row_bytes = width as usize * 3;
    if stride < row_bytes || data.len() < stride * (height as usize).saturating_sub(1) + row_bytes {
        return Err(PlayerError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("像素数据不足: {}x{} stride {}", width, height, stride),
        )));
    }

    write!(out, "P6\n{} {}\n255\n", width, height)?;
    for row in 0..height as usize {
        let start = row * stride;
        out.write_all(&data[start..start + row_bytes])?;
    }
    Ok(())
}

/// 保存 RGB24 显示帧到文件
pub fn save_frame(frame: &DisplayFrame, path: &Path) -> Result<()> {
    if frame.format() != Pixel::RGB24 {
        return Err(PlayerError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("PPM 只支持 RGB24，当前格式: {:?}", frame.format()),
        )));
    }

    let mut out = BufWriter::new(File::create(path)?);
    write_ppm(&mut out, frame.width(), frame.height(), frame.stride(0), frame.data(0))?;
    out.flush()?;

    debug!("已保存: {}", path.display());
    Ok(())
}
