use crate::core::{log_ctx, WorkerReport};
use crate::player::queue::{AudioSignal, SignalReceiver};
use log::{debug, info, warn};
use std::io;
use std::thread::{self, JoinHandle};

/// 音频线程（占位实现：只记录日志，不解码不播放）
pub struct AudioWorker {
    signals: SignalReceiver<AudioSignal>,
    handled: u64,
}

impl AudioWorker {
    pub fn new(signals: SignalReceiver<AudioSignal>) -> Self {
        Self {
            signals,
            handled: 0,
        }
    }

    /// 启动音频线程
    pub fn spawn(self) -> io::Result<JoinHandle<WorkerReport>> {
        thread::Builder::new()
            .name("audio_thread".into())
            .spawn(move || self.run())
    }

    fn run(mut self) -> WorkerReport {
        info!("{} 🔊 音频线程启动", log_ctx());

        loop {
            match self.signals.wait_next() {
                Some(AudioSignal::AudioReady) => {
                    self.handled += 1;
                    debug!("{} play audio #{}", log_ctx(), self.handled);
                }
                Some(AudioSignal::Shutdown) => {
                    info!("{} Quit audio thread.", log_ctx());
                    break;
                }
                None => {
                    warn!("{} ⚠ {:?} 信号队列已销毁，音频线程退出", log_ctx(), self.signals.role());
                    break;
                }
            }
        }

        WorkerReport {
            status: 0,
            handled: self.handled,
        }
    }
}
