//! 流水线错误分类.
//!
//! 每个变体的 `Display` 即命令行输出的诊断信息, 底层原因通过 `source()` 链获取.

use std::io;
use std::path::PathBuf;

use decbench_codec::CodecId;
use decbench_core::MediaError;
use thiserror::Error;

/// 流水线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 缺少命令行参数
    #[error("Usage: {program} <input_file> <codec_name> <num_threads>")]
    Usage { program: String },

    /// 未注册指定名称的解码器
    #[error("Codec not found")]
    CodecNotFound { name: String },

    /// 解码器对应的编解码器没有解析器
    #[error("parser not found")]
    ParserNotFound {
        codec: CodecId,
        #[source]
        source: MediaError,
    },

    /// 无法分配解码器实例
    #[error("Could not allocate video codec context")]
    ContextAlloc {
        #[source]
        source: MediaError,
    },

    /// 解码器打开失败
    #[error("Could not open codec")]
    CodecOpen {
        #[source]
        source: MediaError,
    },

    /// 输入文件打开失败
    #[error("Could not open {}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 码流解析失败 (含解析器越界消耗与停滞)
    #[error("Error while parsing")]
    Parse {
        /// 出错位置在输入字节流中的偏移
        offset: u64,
        #[source]
        source: MediaError,
    },

    /// 解码器拒绝数据包
    #[error("Error sending a packet for decoding")]
    DecodeSubmit {
        #[source]
        source: MediaError,
    },

    /// 取出解码帧失败
    #[error("Error during decoding")]
    DecodeDrain {
        #[source]
        source: MediaError,
    },

    /// 读取输入失败
    #[error("Error reading input")]
    Io {
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// 进程退出码: 用法错误为 0, 其余为 1
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } => 0,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_diagnostic_messages() {
        let err = PipelineError::CodecNotFound {
            name: "nope".into(),
        };
        assert_eq!(err.to_string(), "Codec not found");
        assert_eq!(err.exit_code(), 1);

        let err = PipelineError::InputOpen {
            path: PathBuf::from("/no/such/file.h264"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Could not open /no/such/file.h264");
    }

    #[test]
    fn test_usage_exit_code_is_zero() {
        let err = PipelineError::Usage {
            program: "decbench".into(),
        };
        assert_eq!(err.exit_code(), 0);
        assert!(err.to_string().starts_with("Usage: decbench"));
    }

    #[test]
    fn test_source_is_preserved() {
        let err = PipelineError::Parse {
            offset: 12,
            source: MediaError::InvalidData("bad".into()),
        };
        assert_eq!(err.to_string(), "Error while parsing");
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("bad"));
    }
}
