//! 基于 libavcodec (`ffmpeg-next`) 的视频解码器.
//!
//! 这是唯一真正使用并行度提示的引擎: `thread_count` 会配置为
//! libavcodec 的帧级多线程解码.

use std::sync::Once;

use decbench_core::{MediaError, MediaResult};
use ffmpeg_next::codec::threading;
use ffmpeg_next::util::error::EAGAIN;
use ffmpeg_next::util::log::{self as av_log, Level as AvLogLevel};

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::decoder::Decoder;
use crate::frame::{Frame, VideoFrame};
use crate::packet::Packet;

static AV_INIT: Once = Once::new();

/// libavcodec 解码器
pub struct FfmpegVideoDecoder {
    codec_id: CodecId,
    /// libavcodec 中的解码器名称
    av_name: &'static str,
    inner: Option<ffmpeg_next::decoder::Video>,
    /// 复用的输出帧
    scratch: ffmpeg_next::frame::Video,
}

impl FfmpegVideoDecoder {
    fn new(codec_id: CodecId, av_name: &'static str) -> Self {
        Self {
            codec_id,
            av_name,
            inner: None,
            scratch: ffmpeg_next::frame::Video::empty(),
        }
    }

    pub fn create_h264() -> MediaResult<Box<dyn Decoder>> {
        Ok(Box::new(Self::new(CodecId::H264, "h264")))
    }

    pub fn create_hevc() -> MediaResult<Box<dyn Decoder>> {
        Ok(Box::new(Self::new(CodecId::H265, "hevc")))
    }

    pub fn create_mpeg4() -> MediaResult<Box<dyn Decoder>> {
        Ok(Box::new(Self::new(CodecId::Mpeg4, "mpeg4")))
    }

    fn av_error(&self, action: &str, e: ffmpeg_next::Error) -> MediaError {
        MediaError::Codec(format!("libavcodec {} {action}失败: {e}", self.av_name))
    }
}

impl Decoder for FfmpegVideoDecoder {
    fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    fn name(&self) -> &str {
        self.av_name
    }

    fn open(&mut self, params: &CodecParameters) -> MediaResult<()> {
        let mut init_result = Ok(());
        AV_INIT.call_once(|| {
            init_result = ffmpeg_next::init();
            av_log::set_level(AvLogLevel::Quiet);
        });
        init_result.map_err(|e| self.av_error("初始化", e))?;

        let codec = ffmpeg_next::decoder::find_by_name(self.av_name)
            .ok_or_else(|| MediaError::CodecNotFound(self.av_name.to_string()))?;

        let mut context = ffmpeg_next::codec::context::Context::new_with_codec(codec);
        context.set_threading(threading::Config {
            kind: threading::Type::Frame,
            count: params.thread_count,
            ..Default::default()
        });
        log::debug!(
            "libavcodec {}: 帧级多线程, thread_count={}",
            self.av_name,
            params.thread_count
        );

        let decoder = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.video())
            .map_err(|e| self.av_error("打开", e))?;
        self.inner = Some(decoder);
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> MediaResult<()> {
        let Some(decoder) = self.inner.as_mut() else {
            return Err(MediaError::Codec(format!(
                "libavcodec {} 解码器未打开",
                self.av_name
            )));
        };
        let result = if packet.is_empty() {
            decoder.send_eof()
        } else {
            decoder.send_packet(&ffmpeg_next::Packet::copy(&packet.data))
        };
        result.map_err(|e| {
            MediaError::Codec(format!(
                "libavcodec {} 送入数据失败: {e}",
                self.av_name
            ))
        })
    }

    fn receive_frame(&mut self) -> MediaResult<Frame> {
        let Some(decoder) = self.inner.as_mut() else {
            return Err(MediaError::Codec(format!(
                "libavcodec {} 解码器未打开",
                self.av_name
            )));
        };
        match decoder.receive_frame(&mut self.scratch) {
            Ok(()) => {
                let mut frame = VideoFrame::new(self.scratch.width(), self.scratch.height());
                frame.pts = self.scratch.pts().unwrap_or(decbench_core::NOPTS_VALUE);
                Ok(Frame::Video(frame))
            }
            Err(ffmpeg_next::Error::Other { errno }) if errno == EAGAIN => {
                Err(MediaError::NeedMoreData)
            }
            Err(ffmpeg_next::Error::Eof) => Err(MediaError::Eof),
            Err(e) => Err(MediaError::Codec(format!(
                "libavcodec {} 解码失败: {e}",
                self.av_name
            ))),
        }
    }
}
