//! 集成测试共用的假解码器与码流构造工具.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;

use decbench::codec::frame::VideoFrame;
use decbench::codec::{CodecId, CodecParameters, Decoder, Frame, Packet};
use decbench::core::{MediaError, MediaResult};
use tempfile::NamedTempFile;

/// 每个数据包产出一帧, 输出延迟 `delay` 个数据包, 刷新时全部释放
pub struct DelayedDecoder {
    codec_id: CodecId,
    delay: usize,
    queue: VecDeque<Frame>,
    flushing: bool,
    opened: bool,
}

impl DelayedDecoder {
    pub fn boxed(codec_id: CodecId, delay: usize) -> Box<dyn Decoder> {
        Box::new(Self {
            codec_id,
            delay,
            queue: VecDeque::new(),
            flushing: false,
            opened: false,
        })
    }
}

impl Decoder for DelayedDecoder {
    fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    fn name(&self) -> &str {
        "delayed"
    }

    fn open(&mut self, _params: &CodecParameters) -> MediaResult<()> {
        self.opened = true;
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> MediaResult<()> {
        if !self.opened || self.flushing {
            return Err(MediaError::Codec("非法状态".into()));
        }
        if packet.is_empty() {
            self.flushing = true;
        } else {
            self.queue.push_back(Frame::Video(VideoFrame::new(64, 64)));
        }
        Ok(())
    }

    fn receive_frame(&mut self) -> MediaResult<Frame> {
        if self.flushing {
            return self.queue.pop_front().ok_or(MediaError::Eof);
        }
        if self.queue.len() > self.delay {
            if let Some(frame) = self.queue.pop_front() {
                return Ok(frame);
            }
        }
        Err(MediaError::NeedMoreData)
    }
}

/// 写入临时文件
pub fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("创建临时文件失败");
    file.write_all(data).expect("写入临时文件失败");
    file.flush().expect("刷新临时文件失败");
    file
}

/// MPEG-1 Layer III, 128 kbps, 44100 Hz 立体声静音帧 (417 字节)
pub fn silent_mp3_frame() -> Vec<u8> {
    let mut frame = vec![0u8; 417];
    frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x04]);
    frame
}

/// `n` 个完整 mp3 帧
pub fn mp3_stream(n: usize) -> Vec<u8> {
    (0..n).flat_map(|_| silent_mp3_frame()).collect()
}

fn nal(header: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x00, 0x01, header];
    out.extend_from_slice(payload);
    out
}

/// H.264 码流: SPS + PPS + IDR, 之后 `frames - 1` 个 P 帧, 末尾附加一个 AUD
///
/// AUD 结束最后一个访问单元, 因此共有 `frames` 个完整访问单元.
pub fn h264_stream(frames: usize) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(nal(0x67, &[0x42, 0x00, 0x1E, 0xAB, 0xCD]));
    data.extend(nal(0x68, &[0xCE, 0x38, 0x80]));
    data.extend(nal(0x65, &[0x88, 0x80, 0x40, 0x12, 0xFF, 0xFE]));
    for i in 1..frames {
        data.extend(nal(0x41, &[0x9A, (i & 0x7F) as u8 | 0x02, 0x01, 0x02, 0x03]));
    }
    data.extend(nal(0x09, &[0xF0]));
    data
}
