//! 窗口显示表面
//!
//! 使用 minifb 软件帧缓冲。窗口必须在渲染线程内创建，
//! 所以只通过 VideoWorker 的表面工厂构造。

use crate::core::{PlayerError, Result};
use crate::player::DisplayFrame;
use crate::renderer::surface::DisplaySurface;
use ffmpeg_next::util::format::Pixel;
use log::{debug, info};
use minifb::{Window, WindowOptions};

/// 窗口表面要求的显示帧格式
pub const WINDOW_PIXEL_FORMAT: Pixel = Pixel::BGRA;

pub struct WindowSurface {
    window: Window,
    width: usize,
    height: usize,
    /// 0RGB 像素缓冲
    buffer: Vec<u32>,
}

impl WindowSurface {
    /// 创建视频窗口
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let w = width as usize;
        let h = height as usize;

        let window = Window::new(
            title,
            w,
            h,
            WindowOptions {
                resize: true,
                scale_mode: minifb::ScaleMode::AspectRatioStretch,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| PlayerError::RenderError(format!("创建窗口失败: {}", e)))?;

        info!("🪟 视频窗口已创建: {}x{}", w, h);

        Ok(Self {
            window,
            width: w,
            height: h,
            buffer: vec![0u32; w * h],
        })
    }
}

/// 把一行 BGRA 字节转换为 0RGB 像素
fn bgra_row_to_u32(src: &[u8], dst: &mut [u32]) {
    for (px, chunk) in dst.iter_mut().zip(src.chunks_exact(4)) {
        *px = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], 0]);
    }
}

impl DisplaySurface for WindowSurface {
    fn upload(&mut self, frame: &DisplayFrame) -> Result<()> {
        if frame.format() != WINDOW_PIXEL_FORMAT {
            return Err(PlayerError::RenderError(format!(
                "窗口只接受 {:?}，收到 {:?}",
                WINDOW_PIXEL_FORMAT,
                frame.format()
            )));
        }

        let cols = (frame.width() as usize).min(self.width);
        let rows = (frame.height() as usize).min(self.height);
        let stride = frame.stride(0);
        let data = frame.data(0);

        for y in 0..rows {
            let src = &data[y * stride..y * stride + cols * 4];
            let dst = &mut self.buffer[y * self.width..y * self.width + cols];
            bgra_row_to_u32(src, dst);
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        if !self.window.is_open() {
            return Err(PlayerError::RenderError("窗口已关闭".into()));
        }
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| PlayerError::RenderError(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "window"
    }
}

impl Drop for WindowSurface {
    fn drop(&mut self) {
        debug!("销毁视频窗口");
    }
}
