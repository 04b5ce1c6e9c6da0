use std::thread;
use std::time::{Duration, Instant};

/// 固定间隔的帧节拍器
///
/// 每帧显示后休眠 `round(1000 / fps)` 毫秒。这不是基于时间戳的播放时钟，
/// 解码抖动会累积为漂移。
#[derive(Debug, Clone)]
pub struct FramePacer {
    delay: Duration,
    last_present: Option<Instant>,
}

/// 每帧显示间隔（毫秒）
pub fn frame_delay_ms(fps: f64) -> u64 {
    (1000.0 / fps).round() as u64
}

impl FramePacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_present: None,
        }
    }

    /// 根据平均帧率创建，帧率非法时使用 fallback
    pub fn from_frame_rate(fps: Option<f64>, fallback_fps: f64) -> Self {
        let fps = fps.filter(|f| f.is_finite() && *f > 0.0).unwrap_or(fallback_fps);
        Self::new(Duration::from_millis(frame_delay_ms(fps)))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 距上次显示的间隔
    pub fn since_last(&self) -> Option<Duration> {
        self.last_present.map(|t| t.elapsed())
    }

    /// 记录一次显示并休眠固定间隔
    pub fn presented(&mut self) {
        self.last_present = Some(Instant::now());
        thread::sleep(self.delay);
    }
}
