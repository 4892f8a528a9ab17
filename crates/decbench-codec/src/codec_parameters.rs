//! 编解码器参数.
//!
//! 对标 FFmpeg 的 `AVCodecContext` 中打开解码器前设置的字段.

use crate::codec_id::CodecId;

/// 解码器配置参数
///
/// 在 [`crate::Decoder::open`] 时一次性传入, 运行过程中不再修改.
#[derive(Debug, Clone)]
pub struct CodecParameters {
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 并行度提示: 期望的解码工作线程数, 0 表示由解码器自行决定
    pub thread_count: usize,
}

impl CodecParameters {
    /// 创建指定编解码器的参数
    pub fn new(codec_id: CodecId) -> Self {
        Self {
            codec_id,
            thread_count: 0,
        }
    }

    /// 设置并行度提示
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }
}
