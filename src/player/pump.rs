use crate::core::{log_ctx, Result, StreamInfo};
use crate::player::decoder::{FrameDecoder, RawFrame};
use crate::player::packet_source::PacketSource;
use ffmpeg_next::Packet;
use log::{info, warn};
use std::ops::ControlFlow;

/// 泵运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// 从容器读取的全部包
    pub packets_read: u64,
    /// 属于所选流、交给回调的包
    pub packets_forwarded: u64,
    /// 其他流的包（直接释放）
    pub packets_skipped: u64,
    /// 被解码器拒绝的包
    pub packets_rejected: u64,
    /// 解码输出的帧
    pub frames_decoded: u64,
    /// 回调要求提前结束
    pub stopped_early: bool,
}

/// 数据包泵 - 顺序读取容器，只把所选流的包交给解码器
pub struct PacketPump<S: PacketSource> {
    source: S,
    stream_index: usize,
    stats: PumpStats,
}

impl<S: PacketSource> PacketPump<S> {
    pub fn new(source: S, stream: &StreamInfo) -> Self {
        Self {
            source,
            stream_index: stream.index,
            stats: PumpStats::default(),
        }
    }

    pub fn stats(&self) -> PumpStats {
        self.stats
    }

    /// 读取全部数据包，所选流的包交给 on_packet，其余直接释放
    pub fn run<F>(&mut self, on_packet: F) -> Result<PumpStats>
    where
        F: FnMut(Packet) -> ControlFlow<()>,
    {
        self.run_observed(on_packet, |_| ControlFlow::Continue(()))
    }

    /// 同 run，另外把被丢弃包的流索引报告给 on_skipped
    pub fn run_observed<F, G>(&mut self, mut on_packet: F, mut on_skipped: G) -> Result<PumpStats>
    where
        F: FnMut(Packet) -> ControlFlow<()>,
        G: FnMut(usize) -> ControlFlow<()>,
    {
        info!("{} 🎬 开始读取: {}", log_ctx(), self.source.description());

        // 读取错误直接返回，不重试
        while let Some(packet) = self.source.read_packet()? {
            self.stats.packets_read += 1;

            let flow = if packet.stream() == self.stream_index {
                self.stats.packets_forwarded += 1;
                on_packet(packet)
            } else {
                self.stats.packets_skipped += 1;
                let index = packet.stream();
                drop(packet);
                on_skipped(index)
            };

            if flow.is_break() {
                info!("{} ⏹ 回调要求停止读取", log_ctx());
                self.stats.stopped_early = true;
                break;
            }
        }

        info!(
            "{} 📄 读取结束（共 {} 个包：{} 转发，{} 跳过）",
            log_ctx(),
            self.stats.packets_read,
            self.stats.packets_forwarded,
            self.stats.packets_skipped
        );

        Ok(self.stats)
    }

    /// 把所选流的包送入解码器，并逐帧交给 on_frame
    ///
    /// 每个包提交后取空解码器再读下一个包；被拒绝的包记录日志后继续。
    /// 到达文件末尾后向解码器发送 EOF 并取出剩余帧。
    pub fn feed<D, F, G>(&mut self, decoder: &mut D, mut on_frame: F, on_skipped: G) -> Result<PumpStats>
    where
        D: FrameDecoder,
        F: FnMut(RawFrame) -> ControlFlow<()>,
        G: FnMut(usize) -> ControlFlow<()>,
    {
        let mut rejected = 0u64;
        let mut decoded = 0u64;

        let mut stats = self.run_observed(
            |packet| {
                if let Err(e) = decoder.submit(&packet) {
                    warn!("{} ❌ 数据包被解码器拒绝: {}", log_ctx(), e);
                    rejected += 1;
                    return ControlFlow::Continue(());
                }
                drop(packet);
                drain(&mut *decoder, &mut decoded, &mut on_frame)
            },
            on_skipped,
        )?;

        if !stats.stopped_early {
            match decoder.finish() {
                Ok(()) => {
                    if drain(decoder, &mut decoded, &mut on_frame).is_break() {
                        stats.stopped_early = true;
                    }
                }
                Err(e) => warn!("{} 解码器 flush 失败: {}", log_ctx(), e),
            }
        }

        stats.packets_rejected = rejected;
        stats.frames_decoded = decoded;
        self.stats = stats;

        info!(
            "{} ✅ 解码完成：{} 帧，{} 个包被拒绝",
            log_ctx(),
            decoded,
            rejected
        );

        Ok(stats)
    }
}

/// 取出解码器中当前可用的所有帧
fn drain<D, F>(decoder: &mut D, decoded: &mut u64, on_frame: &mut F) -> ControlFlow<()>
where
    D: FrameDecoder,
    F: FnMut(RawFrame) -> ControlFlow<()>,
{
    loop {
        match decoder.receive() {
            Ok(Some(frame)) => {
                *decoded += 1;
                if on_frame(frame).is_break() {
                    return ControlFlow::Break(());
                }
            }
            Ok(None) => return ControlFlow::Continue(()),
            Err(e) => {
                warn!("{} 解码错误（已跳过）: {}", log_ctx(), e);
                return ControlFlow::Continue(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MediaKind, PlayerError};
    use ffmpeg_next as ffmpeg;
    use ffmpeg_next::util::frame::Video;
    use std::collections::VecDeque;

    /// 按给定流索引序列产生数据包
    struct FakeSource {
        packets: VecDeque<usize>,
        fail_after: Option<usize>,
        read: usize,
    }

    impl FakeSource {
        fn new(indices: &[usize]) -> Self {
            Self {
                packets: indices.iter().copied().collect(),
                fail_after: None,
                read: 0,
            }
        }
    }

    impl PacketSource for FakeSource {
        fn read_packet(&mut self) -> Result<Option<Packet>> {
            if self.fail_after == Some(self.read) {
                return Err(PlayerError::ReadFailed(ffmpeg::Error::InvalidData));
            }
            self.read += 1;
            Ok(self.packets.pop_front().map(|index| {
                let mut packet = Packet::copy(&[0u8, 1, 2, 3]);
                packet.set_stream(index);
                packet
            }))
        }

        fn description(&self) -> String {
            "fake".into()
        }
    }

    /// 每个包产生 frames_per_packet 帧，指定序号的提交会被拒绝
    struct FakeDecoder {
        frames_per_packet: usize,
        reject: Vec<u64>,
        submitted: u64,
        pending: usize,
        buffered_at_eof: usize,
        pictures: u64,
        finished: bool,
    }

    impl FakeDecoder {
        fn new(frames_per_packet: usize) -> Self {
            Self {
                frames_per_packet,
                reject: Vec::new(),
                submitted: 0,
                pending: 0,
                buffered_at_eof: 0,
                pictures: 0,
                finished: false,
            }
        }
    }

    impl FrameDecoder for FakeDecoder {
        fn submit(&mut self, _packet: &Packet) -> Result<()> {
            let n = self.submitted;
            self.submitted += 1;
            if self.reject.contains(&n) {
                return Err(PlayerError::Decode(ffmpeg::Error::InvalidData));
            }
            self.pending += self.frames_per_packet;
            Ok(())
        }

        fn receive(&mut self) -> Result<Option<RawFrame>> {
            if self.pending == 0 {
                return Ok(None);
            }
            self.pending -= 1;
            let picture_number = self.pictures;
            self.pictures += 1;
            Ok(Some(RawFrame {
                frame: Video::empty(),
                picture_number,
            }))
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            self.pending += self.buffered_at_eof;
            Ok(())
        }
    }

    fn video_stream(index: usize) -> StreamInfo {
        StreamInfo {
            index,
            kind: MediaKind::Video,
            codec: "fake".into(),
            width: 16,
            height: 16,
            avg_frame_rate: (25, 1),
        }
    }

    #[test]
    fn test_only_selected_stream_is_forwarded() {
        let mut pump = PacketPump::new(FakeSource::new(&[0, 1, 0, 2, 1, 1, 0]), &video_stream(1));
        let mut forwarded = Vec::new();
        let stats = pump
            .run(|packet| {
                forwarded.push(packet.stream());
                ControlFlow::Continue(())
            })
            .unwrap();

        assert_eq!(forwarded, vec![1, 1, 1]);
        assert_eq!(stats.packets_read, 7);
        assert_eq!(stats.packets_forwarded, 3);
        assert_eq!(stats.packets_skipped, 4);
        assert!(!stats.stopped_early);
    }

    #[test]
    fn test_decoder_sees_only_matching_packets() {
        let indices = [0, 1, 0, 0, 1, 2, 0];
        let matching = indices.iter().filter(|&&i| i == 0).count() as u64;

        let mut pump = PacketPump::new(FakeSource::new(&indices), &video_stream(0));
        let mut decoder = FakeDecoder::new(2);
        let mut frames = Vec::new();
        let mut skipped = Vec::new();

        let stats = pump
            .feed(
                &mut decoder,
                |frame| {
                    frames.push(frame.picture_number);
                    ControlFlow::Continue(())
                },
                |index| {
                    skipped.push(index);
                    ControlFlow::Continue(())
                },
            )
            .unwrap();

        assert_eq!(decoder.submitted, matching);
        assert_eq!(frames, (0..matching * 2).collect::<Vec<_>>());
        assert_eq!(skipped, vec![1, 1, 2]);
        assert_eq!(stats.frames_decoded, matching * 2);
        assert!(decoder.finished);
    }

    #[test]
    fn test_rejected_packet_is_not_fatal() {
        let mut pump = PacketPump::new(FakeSource::new(&[0, 0, 0]), &video_stream(0));
        let mut decoder = FakeDecoder::new(1);
        decoder.reject = vec![1];

        let mut count = 0;
        let stats = pump
            .feed(
                &mut decoder,
                |_| {
                    count += 1;
                    ControlFlow::Continue(())
                },
                |_| ControlFlow::Continue(()),
            )
            .unwrap();

        assert_eq!(decoder.submitted, 3);
        assert_eq!(stats.packets_rejected, 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_zero_or_many_frames_per_packet_and_eof_drain() {
        let mut pump = PacketPump::new(FakeSource::new(&[0, 0]), &video_stream(0));
        let mut decoder = FakeDecoder::new(0);
        decoder.buffered_at_eof = 3;

        let mut frames = Vec::new();
        let stats = pump
            .feed(
                &mut decoder,
                |frame| {
                    frames.push(frame.picture_number);
                    ControlFlow::Continue(())
                },
                |_| ControlFlow::Continue(()),
            )
            .unwrap();

        assert_eq!(frames, vec![0, 1, 2]);
        assert_eq!(stats.frames_decoded, 3);
    }

    #[test]
    fn test_break_stops_reading() {
        let mut pump = PacketPump::new(FakeSource::new(&[0, 0, 0, 0, 0]), &video_stream(0));
        let mut decoder = FakeDecoder::new(1);

        let stats = pump
            .feed(
                &mut decoder,
                |frame| {
                    if frame.picture_number == 1 {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                },
                |_| ControlFlow::Continue(()),
            )
            .unwrap();

        assert!(stats.stopped_early);
        assert_eq!(decoder.submitted, 2);
        assert!(!decoder.finished);
    }

    #[test]
    fn test_read_error_is_surfaced() {
        let mut source = FakeSource::new(&[0, 0, 0]);
        source.fail_after = Some(2);
        let mut pump = PacketPump::new(source, &video_stream(0));

        let mut seen = 0;
        let err = pump
            .run(|_| {
                seen += 1;
                ControlFlow::Continue(())
            })
            .unwrap_err();

        assert!(matches!(err, PlayerError::ReadFailed(_)));
        assert_eq!(seen, 2);
        assert_eq!(pump.stats().packets_read, 2);
    }

    #[test]
    fn test_real_decoder_numbers_frames_in_order() {
        use crate::player::test_media::write_video_clip;
        use crate::player::{Container, Decoder};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.avi");
        write_video_clip(&path, 30, 25);

        let container = Container::open(&path).unwrap();
        let video = container.select_stream(MediaKind::Video).unwrap();
        let mut decoder = Decoder::open(container.parameters(&video).unwrap(), &video).unwrap();
        let mut pump = PacketPump::new(container, &video);

        let mut numbers = Vec::new();
        let stats = pump
            .feed(
                &mut decoder,
                |frame| {
                    numbers.push(frame.picture_number);
                    ControlFlow::Continue(())
                },
                |_| ControlFlow::Continue(()),
            )
            .unwrap();

        assert_eq!(numbers, (0..30).collect::<Vec<u64>>());
        assert_eq!(stats.frames_decoded, 30);
        assert_eq!(stats.packets_rejected, 0);
        assert_eq!(stats.packets_skipped, 0);
    }
}
