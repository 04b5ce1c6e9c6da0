// 播放器核心模块：读包 -> 解码 -> 转换 -> 显示队列

pub mod packet_source;
pub mod container;
pub mod decoder;
pub mod frame_pool;
pub mod converter;
pub mod queue;
pub mod pump;
pub mod frame_dump;
pub mod audio_worker;
pub mod manager;
#[cfg(test)]
pub(crate) mod test_media;

pub use container::Container;
pub use converter::ColorConverter;
pub use decoder::Decoder;
pub use frame_pool::{DisplayFrame, FramePool, PooledFrame};
pub use pump::{PacketPump, PumpStats};
