//! 测试用媒体文件：用 FFmpeg 编码一段短视频，或手写一个纯音频 WAV

use ffmpeg_next as ffmpeg;
use ffmpeg_next::util::format::Pixel;
use ffmpeg_next::util::frame::Video;
use ffmpeg_next::{codec, encoder, format, Packet, Rational};
use std::path::Path;

pub const CLIP_WIDTH: u32 = 64;
pub const CLIP_HEIGHT: u32 = 48;

/// 编码 `frames` 帧 MPEG-4 视频到 AVI（无 B 帧，解码输出帧数与输入相同）
pub fn write_video_clip(path: &Path, frames: usize, fps: i32) {
    ffmpeg::init().unwrap();

    let time_base = Rational::new(1, fps);
    let codec = encoder::find(codec::Id::MPEG4).expect("mpeg4 encoder");

    let mut octx = format::output(&path).unwrap();
    let mut ost = octx.add_stream(codec).unwrap();

    let mut enc = codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .unwrap();
    enc.set_width(CLIP_WIDTH);
    enc.set_height(CLIP_HEIGHT);
    enc.set_format(Pixel::YUV420P);
    enc.set_time_base(time_base);
    enc.set_frame_rate(Some(Rational::new(fps, 1)));
    enc.set_max_b_frames(0);

    let mut enc = enc.open_as(codec).unwrap();
    ost.set_parameters(&enc);
    ost.set_time_base(time_base);
    drop(ost);

    octx.write_header().unwrap();
    let stream_time_base = octx.stream(0).unwrap().time_base();

    for i in 0..frames {
        let mut frame = Video::new(Pixel::YUV420P, CLIP_WIDTH, CLIP_HEIGHT);
        let stride = frame.stride(0);
        for (n, b) in frame.data_mut(0).iter_mut().enumerate() {
            *b = ((n % stride + i) % 220 + 16) as u8;
        }
        for plane in 1..3 {
            frame.data_mut(plane).iter_mut().for_each(|b| *b = 128);
        }
        frame.set_pts(Some(i as i64));

        enc.send_frame(&frame).unwrap();
        write_packets(&mut enc, &mut octx, time_base, stream_time_base);
    }

    enc.send_eof().unwrap();
    write_packets(&mut enc, &mut octx, time_base, stream_time_base);
    octx.write_trailer().unwrap();
}

fn write_packets(
    enc: &mut encoder::video::Encoder,
    octx: &mut format::context::Output,
    from: Rational,
    to: Rational,
) {
    let mut packet = Packet::empty();
    while enc.receive_packet(&mut packet).is_ok() {
        packet.set_stream(0);
        packet.rescale_ts(from, to);
        packet.write_interleaved(octx).unwrap();
    }
}

/// 写出单声道 16 位 PCM WAV（只有一路音频流）
pub fn write_audio_only(path: &Path, samples: u32) {
    let sample_rate = 8000u32;
    let data_len = samples * 2;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // 单声道
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    std::fs::write(path, bytes).unwrap();
}
