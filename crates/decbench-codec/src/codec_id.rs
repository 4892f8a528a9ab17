//! 编解码器标识符.
//!
//! 对标 FFmpeg 的 `AVCodecID`. 解码器按名称注册, 解析器按 `CodecId` 注册,
//! 二者通过 `CodecId` 关联.

use std::fmt;
use decbench_core::MediaType;

/// 编解码器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// MPEG-4 Part 2 (ASP)
    Mpeg4,
    /// MPEG-1/2 Audio Layer I
    Mp1,
    /// MPEG-1/2 Audio Layer II
    Mp2,
    /// MPEG-1/2 Audio Layer III
    Mp3,
}

impl CodecId {
    /// 获取编解码器的媒体类型
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::H264 | Self::H265 | Self::Mpeg4 => MediaType::Video,
            Self::Mp1 | Self::Mp2 | Self::Mp3 => MediaType::Audio,
        }
    }

    /// 获取编解码器的短名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Mpeg4 => "mpeg4",
            Self::Mp1 => "mp1",
            Self::Mp2 => "mp2",
            Self::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
