//! 解码后的帧 (Frame).
//!
//! 对标 FFmpeg 的 `AVFrame`. 基准测试只统计帧数, 从不检查像素/采样内容,
//! 因此这里只保留帧的描述信息, 不复制解码后的数据.

use decbench_core::{MediaType, NOPTS_VALUE};

/// 视频帧描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 显示时间戳 (PTS)
    pub pts: i64,
}

impl VideoFrame {
    /// 创建视频帧描述
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pts: NOPTS_VALUE,
        }
    }
}

/// 音频帧描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    /// 本帧包含的采样数 (每声道)
    pub nb_samples: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道数
    pub channels: u32,
    /// 显示时间戳 (PTS)
    pub pts: i64,
}

impl AudioFrame {
    /// 创建音频帧描述
    pub fn new(nb_samples: u32, sample_rate: u32, channels: u32) -> Self {
        Self {
            nb_samples,
            sample_rate,
            channels,
            pts: NOPTS_VALUE,
        }
    }
}

/// 解码后的帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// 视频帧
    Video(VideoFrame),
    /// 音频帧
    Audio(AudioFrame),
}

impl Frame {
    /// 帧的媒体类型
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Video(_) => MediaType::Video,
            Self::Audio(_) => MediaType::Audio,
        }
    }

    /// 显示时间戳
    pub fn pts(&self) -> i64 {
        match self {
            Self::Video(v) => v.pts,
            Self::Audio(a) => a.pts,
        }
    }
}
