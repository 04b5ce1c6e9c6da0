use crate::core::Result;
use crate::player::DisplayFrame;
use ffmpeg_next::util::format::Pixel;
use log::debug;

/// 显示表面抽象：上传一帧像素数据，然后呈现
pub trait DisplaySurface {
    /// 复制显示帧的像素到表面（整帧区域标记为脏）
    fn upload(&mut self, frame: &DisplayFrame) -> Result<()>;

    /// 呈现最近一次上传的内容
    fn present(&mut self) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// 平面中每个像素占用的字节数（8 位格式）
pub fn bytes_per_pixel(format: Pixel, plane: usize) -> usize {
    match (format, plane) {
        (Pixel::RGB24 | Pixel::BGR24, 0) => 3,
        (Pixel::BGRA | Pixel::RGBA | Pixel::ARGB | Pixel::ABGR | Pixel::ZRGB | Pixel::BGRZ, 0) => 4,
        (Pixel::NV12 | Pixel::NV21, 1) => 2,
        _ => 1,
    }
}

/// 无窗口表面：保存上传的像素（等同纹理），只计数呈现次数
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    planes: Vec<Vec<u8>>,
    uploads: u64,
    presents: u64,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        debug!("创建无窗口显示表面: {}x{}", width, height);
        Self {
            width,
            height,
            planes: Vec::new(),
            uploads: 0,
            presents: 0,
        }
    }

    #[cfg(test)]
    pub fn presents(&self) -> u64 {
        self.presents
    }

    /// 最近一次上传的平面数据（已去除行尾填充）
    #[cfg(test)]
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(Vec::as_slice)
    }
}

impl DisplaySurface for HeadlessSurface {
    fn upload(&mut self, frame: &DisplayFrame) -> Result<()> {
        let width = frame.width().min(self.width);
        let height = frame.height().min(self.height);

        self.planes.resize_with(frame.planes(), Vec::new);
        for (index, plane) in self.planes.iter_mut().enumerate() {
            let row_bytes = (frame.plane_width(index).min(width) as usize
                * bytes_per_pixel(frame.format(), index))
            .min(frame.stride(index));
            let rows = frame.plane_height(index).min(height) as usize;
            let stride = frame.stride(index);
            let data = frame.data(index);

            plane.clear();
            for row in 0..rows {
                let start = row * stride;
                plane.extend_from_slice(&data[start..start + row_bytes]);
            }
        }

        self.uploads += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        debug!(
            "释放无窗口显示表面（上传 {} 次，呈现 {} 次）",
            self.uploads, self.presents
        );
    }
}
