//! 码流解析器实现.
//!
//! - H.264 / HEVC: Annex B 起始码, 按访问单元切分
//! - MPEG-4 Part 2: 起始码, 按 VOP 切分
//! - MPEG 音频 (mp1/mp2/mp3): 按帧头计算的帧长切分

pub mod h264;
pub mod hevc;
pub mod mpeg4;
pub mod mpeg_audio;
mod start_code;

use crate::codec_id::CodecId;
use crate::registry::CodecRegistry;

/// 注册所有内置解析器
pub fn register_all_parsers(registry: &mut CodecRegistry) {
    registry.register_parser(CodecId::H264, "h264", h264::H264Parser::create);
    registry.register_parser(CodecId::H265, "hevc", hevc::HevcParser::create);
    registry.register_parser(CodecId::Mpeg4, "mpeg4video", mpeg4::Mpeg4Parser::create);
    registry.register_parser(
        CodecId::Mp1,
        "mpegaudio",
        mpeg_audio::MpegAudioParser::create_mp1,
    );
    registry.register_parser(
        CodecId::Mp2,
        "mpegaudio",
        mpeg_audio::MpegAudioParser::create_mp2,
    );
    registry.register_parser(
        CodecId::Mp3,
        "mpegaudio",
        mpeg_audio::MpegAudioParser::create_mp3,
    );
}
