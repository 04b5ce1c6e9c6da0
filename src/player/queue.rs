use crate::player::frame_pool::PooledFrame;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;

/// 信号消费者角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Video,
    Audio,
}

/// 发往渲染线程的信号
pub enum VideoSignal {
    /// 一帧已转换完成，所有权随信号转移
    FrameReady(PooledFrame),
    Shutdown,
}

/// 发往音频线程的信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSignal {
    AudioReady,
    Shutdown,
}

/// 跨线程信号
pub enum Signal {
    Video(VideoSignal),
    Audio(AudioSignal),
}

impl Signal {
    pub fn frame_ready(frame: PooledFrame) -> Self {
        Signal::Video(VideoSignal::FrameReady(frame))
    }

    pub fn audio_ready() -> Self {
        Signal::Audio(AudioSignal::AudioReady)
    }

    pub fn shutdown(role: Role) -> Self {
        match role {
            Role::Video => Signal::Video(VideoSignal::Shutdown),
            Role::Audio => Signal::Audio(AudioSignal::Shutdown),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Signal::Video(_) => Role::Video,
            Signal::Audio(_) => Role::Audio,
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Video(VideoSignal::FrameReady(frame)) => {
                write!(f, "FrameReady(#{})", frame.picture_number())
            }
            Signal::Video(VideoSignal::Shutdown) => f.write_str("Shutdown(Video)"),
            Signal::Audio(AudioSignal::AudioReady) => f.write_str("AudioReady"),
            Signal::Audio(AudioSignal::Shutdown) => f.write_str("Shutdown(Audio)"),
        }
    }
}

/// 信号发送端，可克隆给多个生产者
#[derive(Clone)]
pub struct SignalSender {
    video_tx: Sender<VideoSignal>,
    audio_tx: Sender<AudioSignal>,
}

impl SignalSender {
    /// 按角色投递信号（无界，不阻塞）
    ///
    /// 对应角色的消费者已退出时返回原信号
    pub fn push(&self, signal: Signal) -> Result<(), Signal> {
        match signal {
            Signal::Video(s) => self.video_tx.send(s).map_err(|e| Signal::Video(e.0)),
            Signal::Audio(s) => self.audio_tx.send(s).map_err(|e| Signal::Audio(e.0)),
        }
    }
}

/// 单角色信号接收端
pub struct SignalReceiver<T> {
    role: Role,
    rx: Receiver<T>,
}

impl<T> SignalReceiver<T> {
    /// 阻塞等待下一个信号；队列被销毁（所有发送端已 drop）时返回 None
    pub fn wait_next(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// 尚未处理的信号数
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// 显示队列：解码线程与渲染/音频线程之间的信号通道
///
/// 每个角色一个 FIFO 通道，同一生产者投递的信号按顺序到达。
/// 每个角色只有一个消费者（subscribe 只能成功一次）。
pub struct PresentationQueue {
    sender: SignalSender,
    video_rx: Option<Receiver<VideoSignal>>,
    audio_rx: Option<Receiver<AudioSignal>>,
}

impl PresentationQueue {
    pub fn new() -> Self {
        let (video_tx, video_rx) = unbounded();
        let (audio_tx, audio_rx) = unbounded();
        Self {
            sender: SignalSender { video_tx, audio_tx },
            video_rx: Some(video_rx),
            audio_rx: Some(audio_rx),
        }
    }

    pub fn push(&self, signal: Signal) -> Result<(), Signal> {
        self.sender.push(signal)
    }

    #[cfg(test)]
    pub fn sender(&self) -> SignalSender {
        self.sender.clone()
    }

    /// 取出渲染线程的接收端
    pub fn subscribe_video(&mut self) -> Option<SignalReceiver<VideoSignal>> {
        self.video_rx.take().map(|rx| SignalReceiver {
            role: Role::Video,
            rx,
        })
    }

    /// 取出音频线程的接收端
    pub fn subscribe_audio(&mut self) -> Option<SignalReceiver<AudioSignal>> {
        self.audio_rx.take().map(|rx| SignalReceiver {
            role: Role::Audio,
            rx,
        })
    }
}

impl Default for PresentationQueue {
    fn default() -> Self {
        Self::new()
    }
}
