use crate::core::{PlayerError, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use ffmpeg_next::util;
use ffmpeg_next::util::format::Pixel;
use log::debug;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// 目标格式的显示帧（像素数据由内部 AVFrame 持有）
pub struct DisplayFrame {
    frame: util::frame::Video,
    picture_number: u64,
}

impl DisplayFrame {
    /// 分配指定格式和尺寸的帧缓冲
    pub fn alloc(format: Pixel, width: u32, height: u32) -> Result<Self> {
        let frame = util::frame::Video::new(format, width, height);

        // av_frame_get_buffer 失败时 data[0] 为空
        let allocated = unsafe { !(*frame.as_ptr()).data[0].is_null() };
        if !allocated {
            return Err(PlayerError::AllocFailed(format!(
                "{:?} {}x{} 帧缓冲",
                format, width, height
            )));
        }

        Ok(Self {
            frame,
            picture_number: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    pub fn format(&self) -> Pixel {
        self.frame.format()
    }

    pub fn planes(&self) -> usize {
        self.frame.planes()
    }

    /// 平面可见宽度（像素，色度平面按子采样缩小）
    pub fn plane_width(&self, plane: usize) -> u32 {
        self.frame.plane_width(plane)
    }

    pub fn plane_height(&self, plane: usize) -> u32 {
        self.frame.plane_height(plane)
    }

    /// 平面数据（含行尾填充）
    pub fn data(&self, plane: usize) -> &[u8] {
        self.frame.data(plane)
    }

    pub fn data_mut(&mut self, plane: usize) -> &mut [u8] {
        self.frame.data_mut(plane)
    }

    /// 行跨度（字节），可能大于可见宽度
    pub fn stride(&self, plane: usize) -> usize {
        self.frame.stride(plane)
    }

    /// 来源帧的解码序号
    pub fn picture_number(&self) -> u64 {
        self.picture_number
    }

    pub(crate) fn set_picture_number(&mut self, picture_number: u64) {
        self.picture_number = picture_number;
    }

    pub(crate) fn as_video_mut(&mut self) -> &mut util::frame::Video {
        &mut self.frame
    }
}

/// 显示帧缓冲池
///
/// 帧以所有权形式随信号传递给渲染线程，PooledFrame 被 drop 时自动归还。
/// 所有缓冲都在使用中时 acquire 阻塞，从而对解码线程形成背压。
pub struct FramePool {
    free_tx: Sender<DisplayFrame>,
    free_rx: Receiver<DisplayFrame>,
}

impl FramePool {
    pub fn new(capacity: usize, format: Pixel, width: u32, height: u32) -> Result<Self> {
        let (free_tx, free_rx) = unbounded();
        for _ in 0..capacity {
            let frame = DisplayFrame::alloc(format, width, height)?;
            // 接收端由自身持有，发送不会失败
            let _ = free_tx.send(frame);
        }

        debug!("帧缓冲池: {} 个 {:?} {}x{}", capacity, format, width, height);

        Ok(Self { free_tx, free_rx })
    }

    /// 取出一个空闲缓冲，等待最多 timeout
    pub fn acquire_timeout(&self, timeout: Duration) -> Option<PooledFrame> {
        match self.free_rx.recv_timeout(timeout) {
            Ok(frame) => Some(self.wrap(frame)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// 非阻塞取出
    #[cfg(test)]
    pub fn try_acquire(&self) -> Option<PooledFrame> {
        self.free_rx.try_recv().ok().map(|frame| self.wrap(frame))
    }

    fn wrap(&self, frame: DisplayFrame) -> PooledFrame {
        PooledFrame {
            frame: Some(frame),
            home: self.free_tx.clone(),
        }
    }

    /// 当前空闲的缓冲数
    pub fn available(&self) -> usize {
        self.free_rx.len()
    }
}

/// 从缓冲池借出的显示帧
pub struct PooledFrame {
    frame: Option<DisplayFrame>,
    home: Sender<DisplayFrame>,
}

impl Deref for PooledFrame {
    type Target = DisplayFrame;

    fn deref(&self) -> &DisplayFrame {
        self.frame.as_ref().expect("pooled frame already returned")
    }
}

impl DerefMut for PooledFrame {
    fn deref_mut(&mut self) -> &mut DisplayFrame {
        self.frame.as_mut().expect("pooled frame already returned")
    }
}

impl Drop for PooledFrame {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            // 缓冲池已销毁时直接释放
            let _ = self.home.send(frame);
        }
    }
}
