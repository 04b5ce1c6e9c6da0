use crate::core::{log_ctx, Result, WorkerReport};
use crate::player::audio_worker::AudioWorker;
use crate::player::frame_pool::PooledFrame;
use crate::player::queue::{PresentationQueue, Role, Signal};
use crate::renderer::surface::DisplaySurface;
use crate::renderer::video_worker::{self, VideoWorkerConfig, VideoWorkerHandle};
use log::{debug, info, warn};
use std::thread::JoinHandle;

/// 两个工作线程的退出报告
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub video: WorkerReport,
    pub audio: WorkerReport,
}

/// 播放会话：持有显示队列和两个工作线程
///
/// 解码线程（调用方）通过 present / notify_audio 投递信号，
/// shutdown 依次向视频、音频发送 Shutdown 后等待两个线程退出。
pub struct PlaybackSession {
    queue: PresentationQueue,
    video: Option<VideoWorkerHandle>,
    audio: Option<JoinHandle<WorkerReport>>,
}

impl PlaybackSession {
    /// 先启动音频线程，再启动渲染线程
    pub fn start<S, F>(config: VideoWorkerConfig, make_surface: F) -> Result<Self>
    where
        S: DisplaySurface,
        F: FnOnce(&VideoWorkerConfig) -> Result<S> + Send + 'static,
    {
        let mut queue = PresentationQueue::new();
        let (audio_rx, video_rx) = match (queue.subscribe_audio(), queue.subscribe_video()) {
            (Some(audio), Some(video)) => (audio, video),
            _ => unreachable!("new queue has both receivers"),
        };

        let audio = AudioWorker::new(audio_rx).spawn()?;

        let video = match video_worker::spawn(config, video_rx, make_surface) {
            Ok(handle) => handle,
            Err(e) => {
                // 音频线程已经在运行，先让它退出
                let _ = queue.push(Signal::shutdown(Role::Audio));
                let _ = audio.join();
                return Err(e.into());
            }
        };

        info!("{} ▶️  工作线程已启动", log_ctx());

        Ok(Self {
            queue,
            video: Some(video),
            audio: Some(audio),
        })
    }

    /// 把一帧交给渲染线程；渲染线程已退出时返回 false（帧随即归还缓冲池）
    pub fn present(&self, frame: PooledFrame) -> bool {
        self.queue.push(Signal::frame_ready(frame)).is_ok()
    }

    /// 通知音频线程有音频包到达
    pub fn notify_audio(&self) -> bool {
        self.queue.push(Signal::audio_ready()).is_ok()
    }

    pub fn is_video_running(&self) -> bool {
        self.video.as_ref().is_some_and(VideoWorkerHandle::is_running)
    }

    /// 结束播放并等待工作线程退出
    pub fn shutdown(mut self) -> SessionReport {
        self.stop()
    }

    fn stop(&mut self) -> SessionReport {
        for role in [Role::Video, Role::Audio] {
            if let Err(signal) = self.queue.push(Signal::shutdown(role)) {
                debug!("{} {:?} 线程已提前退出", log_ctx(), signal.role());
            }
        }

        let video = self
            .video
            .take()
            .map(VideoWorkerHandle::join)
            .unwrap_or_default();
        info!("{} Video thread exit: {}", log_ctx(), video.status);

        let audio = self
            .audio
            .take()
            .map(|handle| handle.join().unwrap_or_else(|_| WorkerReport::failed()))
            .unwrap_or_default();
        info!("{} Audio thread exit: {}", log_ctx(), audio.status);

        SessionReport { video, audio }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if self.video.is_some() || self.audio.is_some() {
            warn!("{} ⚠ PlaybackSession 被 drop，但未调用 shutdown()，正在停止工作线程", log_ctx());
            self.stop();
        }
    }
}
