//! 码流解析器吞吐量基准测试.
//!
//! 覆盖起始码切分 (H.264) 与按帧长切分 (MPEG 音频) 两条路径,
//! 以及不同块大小对解析开销的影响.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use decbench::codec::parsers::h264::H264Parser;
use decbench::codec::parsers::mpeg_audio::MpegAudioParser;
use decbench::codec::{CodecId, Parser};

/// 构造 H.264 码流: 每个访问单元一个切片, 负载为不含起始码的伪随机字节
fn make_h264_stream(units: usize, payload: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(units * (payload + 5));
    let mut seed = 0x1234_5678u32;
    for i in 0..units {
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, if i == 0 { 0x65 } else { 0x41 }, 0x88]);
        for _ in 0..payload {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            // 0x02..=0xFF, 不会出现起始码
            data.push(((seed >> 16) as u8).max(0x02));
        }
    }
    data
}

fn make_mp3_stream(frames: usize) -> Vec<u8> {
    let mut frame = vec![0x55u8; 417];
    frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x04]);
    frame.repeat(frames)
}

/// 按块喂给解析器, 返回产出的单元数
fn split(parser: &mut dyn Parser, data: &[u8], chunk_size: usize) -> usize {
    let mut units = 0;
    for chunk in data.chunks(chunk_size) {
        let mut rest = chunk;
        while !rest.is_empty() {
            let (consumed, unit) = parser.parse(rest).unwrap();
            if unit.is_some() {
                units += 1;
            }
            rest = &rest[consumed..];
        }
    }
    units
}

fn bench_h264_parser(c: &mut Criterion) {
    let data = make_h264_stream(500, 2000);
    let mut group = c.benchmark_group("h264_parser");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for chunk_size in [512, 4096, 65536] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut parser = H264Parser::new();
                    black_box(split(&mut parser, black_box(&data), chunk_size))
                })
            },
        );
    }
    group.finish();
}

fn bench_mpeg_audio_parser(c: &mut Criterion) {
    let data = make_mp3_stream(2000);
    let mut group = c.benchmark_group("mpeg_audio_parser");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for chunk_size in [512, 4096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut parser = MpegAudioParser::new(CodecId::Mp3);
                    black_box(split(&mut parser, black_box(&data), chunk_size))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_h264_parser, bench_mpeg_audio_parser);
criterion_main!(benches);
