//! H.264 解码器, 基于 Cisco libopenh264 (`openh264` crate).

use std::collections::VecDeque;

use decbench_core::{MediaError, MediaResult};
use openh264::decoder::Decoder as OpenH264Decoder;
use openh264::formats::YUVSource;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::decoder::Decoder;
use crate::frame::{Frame, VideoFrame};
use crate::packet::Packet;

/// libopenh264 解码器
pub struct OpenH264VideoDecoder {
    inner: Option<OpenH264Decoder>,
    /// 已解码但尚未取出的帧
    ready: VecDeque<VideoFrame>,
    flushing: bool,
}

impl OpenH264VideoDecoder {
    pub fn create() -> MediaResult<Box<dyn Decoder>> {
        Ok(Box::new(Self {
            inner: None,
            ready: VecDeque::new(),
            flushing: false,
        }))
    }
}

fn video_frame(yuv: &impl YUVSource) -> VideoFrame {
    let (width, height) = yuv.dimensions();
    VideoFrame::new(width as u32, height as u32)
}

impl Decoder for OpenH264VideoDecoder {
    fn codec_id(&self) -> CodecId {
        CodecId::H264
    }

    fn name(&self) -> &str {
        "libopenh264"
    }

    fn open(&mut self, params: &CodecParameters) -> MediaResult<()> {
        if params.thread_count > 1 {
            log::debug!(
                "libopenh264: 单线程解码, 忽略并行度提示 thread_count={}",
                params.thread_count
            );
        }
        let decoder = OpenH264Decoder::new()
            .map_err(|e| MediaError::Codec(format!("libopenh264 初始化失败: {e}")))?;
        self.inner = Some(decoder);
        self.ready.clear();
        self.flushing = false;
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> MediaResult<()> {
        let Some(decoder) = self.inner.as_mut() else {
            return Err(MediaError::Codec("libopenh264 解码器未打开".into()));
        };
        if self.flushing {
            return Err(MediaError::Codec("libopenh264 解码器已刷新".into()));
        }

        if packet.is_empty() {
            self.flushing = true;
            let remaining = decoder
                .flush_remaining()
                .map_err(|e| MediaError::Codec(format!("libopenh264 刷新失败: {e}")))?;
            log::debug!("libopenh264: 刷新得到 {} 帧", remaining.len());
            self.ready.extend(remaining.iter().map(video_frame));
            return Ok(());
        }

        match decoder.decode(&packet.data) {
            Ok(Some(yuv)) => self.ready.push_back(video_frame(&yuv)),
            Ok(None) => {}
            Err(e) => return Err(MediaError::Codec(format!("libopenh264 解码失败: {e}"))),
        }
        Ok(())
    }

    fn receive_frame(&mut self) -> MediaResult<Frame> {
        match self.ready.pop_front() {
            Some(frame) => Ok(Frame::Video(frame)),
            None if self.flushing => Err(MediaError::Eof),
            None => Err(MediaError::NeedMoreData),
        }
    }
}
