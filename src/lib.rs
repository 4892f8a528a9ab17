//! # decbench
//!
//! 解码吞吐量基准测试: 分块读取原始码流文件, 由码流解析器切分为编码单元,
//! 送入指定解码器, 统计解码帧数与耗时.
//!
//! ```text
//! 文件字节 → 块 (ChunkReader) → 编码单元 (Parser) → 解码帧 (Decoder) → 帧计数
//! ```
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use decbench::{Benchmark, PipelineOptions};
//!
//! let registry = decbench::default_codec_registry();
//! let bench = Benchmark::new("mp3", PipelineOptions::new(4));
//! let report = bench.run(&registry, "input.mp3")?;
//! println!("{report}");
//! # Ok::<(), decbench::PipelineError>(())
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `decbench-core` | 错误类型与媒体类型 |
//! | `decbench-codec` | 解析器, 解码器与注册表 |
//! | `decbench` | 读取, 流水线驱动与计时 |

/// 核心类型 (对标 libavutil)
pub use decbench_core as core;

/// 编解码层 (对标 libavcodec)
pub use decbench_codec as codec;

pub mod benchmark;
pub mod driver;
pub mod error;
pub mod reader;

pub use benchmark::{BenchReport, Benchmark};
pub use driver::{DriverState, PipelineDriver, PipelineOptions, PipelineStats};
pub use error::PipelineError;
pub use reader::{ChunkReader, DEFAULT_CHUNK_SIZE, INPUT_PADDING_SIZE, RawBuffer};

/// 获取 decbench 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置解码器与解析器的注册表
pub fn default_codec_registry() -> decbench_codec::CodecRegistry {
    let mut registry = decbench_codec::CodecRegistry::new();
    decbench_codec::register_all(&mut registry);
    registry
}
