// 渲染模块：显示表面 + 渲染线程

pub mod surface;
pub mod video_worker;
#[cfg(feature = "window")]
pub mod window;

pub use surface::{DisplaySurface, HeadlessSurface};
pub use video_worker::VideoWorkerConfig;
#[cfg(feature = "window")]
pub use window::{WindowSurface, WINDOW_PIXEL_FORMAT};
