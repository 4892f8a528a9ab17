//! # decbench-core
//!
//! decbench 核心库, 提供编解码层共用的错误类型与媒体类型.

pub mod error;
pub mod media_type;

// 重导出常用类型
pub use error::{MediaError, MediaResult};
pub use media_type::MediaType;

/// 未定义时间戳
pub const NOPTS_VALUE: i64 = i64::MIN;
