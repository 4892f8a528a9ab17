//! 解码引擎实现模块.
//!
//! - `mpeg_audio`: symphonia MPEG 音频解码器 (feature `symphonia-backend`, 默认启用)
//! - `openh264`: libopenh264 H.264 解码器 (feature `openh264`)
//! - `ffmpeg`: libavcodec 视频解码器 (feature `ffmpeg`)

#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
#[cfg(feature = "symphonia-backend")]
pub mod mpeg_audio;
#[cfg(feature = "openh264")]
pub mod openh264;

#[allow(unused_imports)]
use crate::codec_id::CodecId;
use crate::registry::CodecRegistry;

/// 注册所有已启用的解码器
#[allow(unused_variables)]
pub fn register_all_decoders(registry: &mut CodecRegistry) {
    #[cfg(feature = "symphonia-backend")]
    {
        registry.register_decoder(CodecId::Mp1, "mp1", mpeg_audio::MpegAudioDecoder::create_mp1);
        registry.register_decoder(CodecId::Mp2, "mp2", mpeg_audio::MpegAudioDecoder::create_mp2);
        registry.register_decoder(CodecId::Mp3, "mp3", mpeg_audio::MpegAudioDecoder::create_mp3);
    }

    #[cfg(feature = "openh264")]
    registry.register_decoder(
        CodecId::H264,
        "libopenh264",
        openh264::OpenH264VideoDecoder::create,
    );

    #[cfg(feature = "ffmpeg")]
    {
        registry.register_decoder(CodecId::H264, "h264", ffmpeg::FfmpegVideoDecoder::create_h264);
        registry.register_decoder(CodecId::H265, "hevc", ffmpeg::FfmpegVideoDecoder::create_hevc);
        registry.register_decoder(
            CodecId::Mpeg4,
            "mpeg4",
            ffmpeg::FfmpegVideoDecoder::create_mpeg4,
        );
    }
}
