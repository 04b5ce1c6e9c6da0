// 应用入口：抽帧保存 / 定速播放两种模式

use crate::core::{FramePacer, MediaInfo, MediaKind, Mode, PlayerConfig, Result};
use crate::player::frame_dump::{frame_path, save_frame, SamplingPolicy};
use crate::player::manager::{PlaybackSession, SessionReport};
use crate::player::{ColorConverter, Container, Decoder, FramePool, PacketPump, PooledFrame, PumpStats};
use crate::renderer::{DisplaySurface, HeadlessSurface, VideoWorkerConfig};
use ffmpeg_next::util::format::Pixel;
use log::{debug, info, warn};
use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

/// 等待空闲缓冲时检查渲染线程的间隔
const ACQUIRE_POLL: Duration = Duration::from_millis(50);

/// 抽帧模式统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpReport {
    pub frames_decoded: u64,
    pub frames_saved: u64,
    pub save_failures: u64,
}

/// 播放模式统计
#[derive(Debug, Clone, Copy)]
pub struct PlayReport {
    pub pump: PumpStats,
    pub presented: u64,
    pub workers: SessionReport,
}

/// 按配置的模式运行
pub fn run(config: &PlayerConfig) -> Result<()> {
    match config.mode {
        Mode::Dump => {
            let report = dump_frames(config)?;
            if report.save_failures > 0 {
                warn!("有 {} 帧保存失败", report.save_failures);
            }
        }
        Mode::Play => {
            let report = play(config)?;
            debug!(
                "工作线程统计: video={:?} audio={:?}，跳过其他流 {} 个包",
                report.workers.video, report.workers.audio, report.pump.packets_skipped
            );
            if report.workers.video.handled < report.presented {
                warn!(
                    "渲染线程只处理了 {}/{} 帧",
                    report.workers.video.handled, report.presented
                );
            }
        }
    }
    Ok(())
}

/// 只读取容器信息，不解码
pub fn probe(path: &Path) -> Result<MediaInfo> {
    let container = Container::open(path)?;
    container.dump();
    Ok(container.media_info())
}

/// 抽帧保存：按解码序号每 sample_every 帧保存一张 PPM
pub fn dump_frames(config: &PlayerConfig) -> Result<DumpReport> {
    let container = Container::open(&config.input)?;
    container.dump();

    let video = container.select_stream(MediaKind::Video)?;
    let mut decoder = Decoder::open(container.parameters(&video)?, &video)?;
    let mut converter = ColorConverter::create(
        decoder.format(),
        Pixel::RGB24,
        decoder.width(),
        decoder.height(),
    )?;

    std::fs::create_dir_all(&config.output_dir)?;
    let policy = SamplingPolicy::every(config.sample_every);
    let mut report = DumpReport::default();

    let mut pump = PacketPump::new(container, &video);
    let stats = pump.feed(
        &mut decoder,
        |raw| {
            if !policy.should_save(raw.picture_number) {
                return ControlFlow::Continue(());
            }

            let frame = match converter.convert(&raw) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("帧 #{} 转换失败: {}", raw.picture_number, e);
                    return ControlFlow::Continue(());
                }
            };

            let path = frame_path(&config.output_dir, frame.picture_number());
            match save_frame(frame, &path) {
                Ok(()) => report.frames_saved += 1,
                Err(e) => {
                    warn!("保存 {} 失败: {}", path.display(), e);
                    report.save_failures += 1;
                }
            }
            ControlFlow::Continue(())
        },
        |_| ControlFlow::Continue(()),
    )?;

    report.frames_decoded = stats.frames_decoded;
    info!(
        "💾 抽帧完成：解码 {} 帧，保存 {} 帧（失败 {}）-> {}",
        report.frames_decoded,
        report.frames_saved,
        report.save_failures,
        config.output_dir.display()
    );

    Ok(report)
}

/// 定速播放
pub fn play(config: &PlayerConfig) -> Result<PlayReport> {
    #[cfg(feature = "window")]
    if !config.headless {
        use crate::renderer::{WindowSurface, WINDOW_PIXEL_FORMAT};
        return play_with(config, WINDOW_PIXEL_FORMAT, |c| {
            WindowSurface::new(&c.title, c.width, c.height)
        });
    }

    #[cfg(not(feature = "window"))]
    if !config.headless {
        warn!("未启用 window 特性，使用无窗口模式");
    }

    play_with(config, Pixel::YUV420P, |c| {
        Ok(HeadlessSurface::new(c.width, c.height))
    })
}

fn play_with<S, F>(config: &PlayerConfig, display_format: Pixel, make_surface: F) -> Result<PlayReport>
where
    S: DisplaySurface,
    F: FnOnce(&VideoWorkerConfig) -> Result<S> + Send + 'static,
{
    // 启动阶段：任何失败都在工作线程启动之前返回
    let container = Container::open(&config.input)?;
    container.dump();

    let video = container.select_stream(MediaKind::Video)?;
    let audio_index = container
        .streams()
        .iter()
        .find(|s| s.kind == MediaKind::Audio)
        .map(|s| s.index);

    let mut decoder = Decoder::open(container.parameters(&video)?, &video)?;
    let (width, height) = (decoder.width(), decoder.height());

    let pacer = FramePacer::from_frame_rate(video.fps(), config.fallback_fps);
    if video.fps().is_none() {
        warn!("流没有有效的平均帧率，使用 {} fps", config.fallback_fps);
    }

    let mut converter = ColorConverter::create(decoder.format(), display_format, width, height)?;
    let pool = FramePool::new(config.frame_pool_size, display_format, width, height)?;

    let session = PlaybackSession::start(
        VideoWorkerConfig {
            title: format!("vidpump - {}", config.input.display()),
            width,
            height,
            delay: pacer.delay(),
        },
        make_surface,
    )?;

    let mut presented = 0u64;
    let mut pump = PacketPump::new(container, &video);
    let result = pump.feed(
        &mut decoder,
        |raw| {
            let Some(mut frame) = acquire(&pool, &session) else {
                info!("渲染线程已退出，停止解码");
                return ControlFlow::Break(());
            };

            if let Err(e) = converter.convert_into(&raw, &mut frame) {
                warn!("帧 #{} 转换失败（已跳过）: {}", raw.picture_number, e);
                return ControlFlow::Continue(());
            }

            if !session.present(frame) {
                info!("渲染线程已退出，停止解码");
                return ControlFlow::Break(());
            }
            presented += 1;
            ControlFlow::Continue(())
        },
        |index| {
            if Some(index) == audio_index {
                session.notify_audio();
            }
            ControlFlow::Continue(())
        },
    );

    // 读取出错时也要先让工作线程退出
    let workers = session.shutdown();
    if workers.video.status != 0 {
        warn!("渲染线程异常退出: {}", workers.video.status);
    }

    let pump_stats = result?;
    info!(
        "🏁 播放结束：读取 {} 个包，解码 {} 帧，显示 {} 帧{}",
        pump_stats.packets_read,
        pump_stats.frames_decoded,
        presented,
        if pump_stats.stopped_early { "（提前停止）" } else { "" }
    );

    Ok(PlayReport {
        pump: pump_stats,
        presented,
        workers,
    })
}

/// 取一个空闲缓冲；渲染线程退出后返回 None
fn acquire(pool: &FramePool, session: &PlaybackSession) -> Option<PooledFrame> {
    loop {
        if let Some(frame) = pool.acquire_timeout(ACQUIRE_POLL) {
            return Some(frame);
        }
        if !session.is_video_running() {
            return None;
        }
    }
}
