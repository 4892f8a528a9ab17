//! 统一错误类型定义.
//!
//! 编解码层 (解析器, 解码器, 注册表) 共用的错误类型.
//! 流水线层的错误分类见 `decbench::PipelineError`.

use thiserror::Error;

/// 编解码层统一错误类型
#[derive(Debug, Error)]
pub enum MediaError {
    /// 不支持的操作
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 编解码器错误
    #[error("编解码器错误: {0}")]
    Codec(String),

    /// 当前没有可取出的输出, 需要送入更多数据
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾, 不会再有输出
    #[error("已到达流末尾")]
    Eof,

    /// 未找到指定的编解码器
    #[error("未找到编解码器: {0}")]
    CodecNotFound(String),

    /// 未找到编解码器对应的码流解析器
    #[error("未找到码流解析器: {0}")]
    ParserNotFound(String),

    /// 无效数据 (损坏或无法识别的码流)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 编解码层统一 Result 类型
pub type MediaResult<T> = Result<T, MediaError>;
