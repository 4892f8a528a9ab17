//! # decbench-codec
//!
//! decbench 编解码层, 提供码流解析器, 解码器抽象与 Packet/Frame 描述.
//!
//! 对标 FFmpeg 的 libavcodec: 解码器按名称查找 (`avcodec_find_decoder_by_name`),
//! 解析器按编解码器查找 (`av_parser_init`), 解码采用 send/receive 两阶段协议.
//!
//! ## 支持的编解码器
//!
//! - **解析器**: H.264, HEVC, MPEG-4 Part 2, MPEG 音频 (mp1/mp2/mp3)
//! - **解码器**: mp1/mp2/mp3 (symphonia); 可选 libopenh264, libavcodec
//!
//! ## 使用示例
//!
//! ```rust
//! use decbench_codec::{CodecId, CodecRegistry};
//!
//! let mut reg = CodecRegistry::new();
//! decbench_codec::register_all(&mut reg);
//!
//! let parser = reg.create_parser(CodecId::H264).unwrap();
//! assert_eq!(parser.name(), "h264");
//! ```

pub mod codec_id;
pub mod codec_parameters;
pub mod decoder;
pub mod decoders;
pub mod frame;
pub mod packet;
pub mod parser;
pub mod parsers;
pub mod registry;

// 重导出常用类型
pub use codec_id::CodecId;
pub use codec_parameters::CodecParameters;
pub use decoder::Decoder;
pub use frame::{AudioFrame, Frame, VideoFrame};
pub use packet::Packet;
pub use parser::Parser;
pub use registry::{CodecRegistry, DecoderEntry};

/// 注册所有内置解码器与解析器
pub fn register_all(registry: &mut CodecRegistry) {
    decoders::register_all_decoders(registry);
    parsers::register_all_parsers(registry);
}
