use crate::core::{log_ctx, FramePacer, Result, WorkerReport};
use crate::player::queue::{SignalReceiver, VideoSignal};
use crate::player::PooledFrame;
use crate::renderer::surface::DisplaySurface;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 渲染线程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Initializing,
    WaitingForSignal,
    Drawing,
    Terminated,
}

/// 渲染线程配置（随线程一起移交）
#[derive(Debug, Clone)]
pub struct VideoWorkerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// 每帧显示后的固定休眠
    pub delay: Duration,
}

/// 渲染线程句柄
pub struct VideoWorkerHandle {
    handle: JoinHandle<WorkerReport>,
    state: Arc<Mutex<RendererState>>,
}

impl VideoWorkerHandle {
    pub fn state(&self) -> RendererState {
        *self.state.lock()
    }

    /// 线程仍在处理信号
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished() && self.state() != RendererState::Terminated
    }

    /// 等待线程结束，线程 panic 时返回失败状态
    pub fn join(self) -> WorkerReport {
        match self.handle.join() {
            Ok(report) => report,
            Err(_) => {
                error!("{} ❌ 渲染线程 panic", log_ctx());
                WorkerReport::failed()
            }
        }
    }
}

/// 启动渲染线程
///
/// 显示表面由 `make_surface` 在渲染线程内创建（窗口不能跨线程移动）。
pub fn spawn<S, F>(
    config: VideoWorkerConfig,
    signals: SignalReceiver<VideoSignal>,
    make_surface: F,
) -> io::Result<VideoWorkerHandle>
where
    S: DisplaySurface,
    F: FnOnce(&VideoWorkerConfig) -> Result<S> + Send + 'static,
{
    let state = Arc::new(Mutex::new(RendererState::Initializing));
    let thread_state = state.clone();

    let handle = thread::Builder::new()
        .name("video_thread".into())
        .spawn(move || run(config, signals, thread_state, make_surface))?;

    Ok(VideoWorkerHandle { handle, state })
}

fn run<S, F>(
    config: VideoWorkerConfig,
    signals: SignalReceiver<VideoSignal>,
    state: Arc<Mutex<RendererState>>,
    make_surface: F,
) -> WorkerReport
where
    S: DisplaySurface,
    F: FnOnce(&VideoWorkerConfig) -> Result<S>,
{
    info!(
        "{} 🖼 渲染线程启动: {}x{}, 每帧 {:?}",
        log_ctx(),
        config.width,
        config.height,
        config.delay
    );

    let mut surface = match make_surface(&config) {
        Ok(surface) => surface,
        Err(e) => {
            error!("{} ❌ 创建显示表面失败: {}", log_ctx(), e);
            *state.lock() = RendererState::Terminated;
            return WorkerReport::failed();
        }
    };
    debug!("{} 显示表面: {}", log_ctx(), surface.name());

    let mut pacer = FramePacer::new(config.delay);
    let mut handled = 0u64;

    let status = loop {
        *state.lock() = RendererState::WaitingForSignal;

        match signals.wait_next() {
            Some(VideoSignal::FrameReady(frame)) => {
                *state.lock() = RendererState::Drawing;
                let picture_number = frame.picture_number();

                if let Err(e) = draw(&mut surface, frame) {
                    error!("{} ❌ 显示失败（帧 #{}）: {}", log_ctx(), picture_number, e);
                    break -1;
                }
                handled += 1;
                if let Some(gap) = pacer.since_last() {
                    debug!("{} 帧 #{} 距上一帧 {:?}", log_ctx(), picture_number, gap);
                }
                pacer.presented();
            }
            Some(VideoSignal::Shutdown) => {
                info!("{} Quit video thread.", log_ctx());
                let pending = signals.pending();
                if pending > 0 {
                    debug!("{} 丢弃 {} 个未处理的信号", log_ctx(), pending);
                }
                break 0;
            }
            None => {
                warn!("{} ⚠ {:?} 信号队列已销毁，渲染线程退出", log_ctx(), signals.role());
                break 0;
            }
        }
    };

    // 释放显示资源；先关闭接收端，Terminated 之后的投递都会失败
    drop(surface);
    drop(signals);
    *state.lock() = RendererState::Terminated;

    WorkerReport { status, handled }
}

/// 上传并呈现一帧；上传完成后缓冲立即归还缓冲池
fn draw<S: DisplaySurface>(surface: &mut S, frame: PooledFrame) -> Result<()> {
    surface.upload(&frame)?;
    drop(frame);
    surface.present()
}
