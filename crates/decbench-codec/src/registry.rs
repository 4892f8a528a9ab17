//! 编解码器注册表.
//!
//! 对标 FFmpeg 的 `avcodec_find_decoder_by_name` 与 `av_parser_init`:
//! 解码器按名称查找, 解析器按 `CodecId` 查找.

use std::collections::HashMap;

use decbench_core::{MediaError, MediaResult};

use crate::codec_id::CodecId;
use crate::decoder::Decoder;
use crate::parser::Parser;

/// 解码器工厂函数类型
pub type DecoderFactory = fn() -> MediaResult<Box<dyn Decoder>>;

/// 解析器工厂函数类型
pub type ParserFactory = fn() -> Box<dyn Parser>;

/// 编解码器注册表
///
/// 管理所有已注册的解码器与解析器.
pub struct CodecRegistry {
    /// 解码器条目 (按注册顺序, 同名时先注册者优先)
    decoders: Vec<DecoderEntry>,
    /// 解析器工厂映射
    parsers: HashMap<CodecId, ParserEntry>,
}

/// 解码器注册条目
pub struct DecoderEntry {
    /// 编解码器标识
    codec_id: CodecId,
    /// 解码器名称
    name: String,
    /// 工厂函数
    factory: DecoderFactory,
}

impl DecoderEntry {
    /// 编解码器标识
    pub fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    /// 解码器名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 分配一个新的解码器实例
    pub fn create(&self) -> MediaResult<Box<dyn Decoder>> {
        (self.factory)()
    }
}

/// 解析器注册条目
struct ParserEntry {
    /// 解析器名称
    name: String,
    /// 工厂函数
    factory: ParserFactory,
}

impl CodecRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
            parsers: HashMap::new(),
        }
    }

    /// 注册一个解码器
    pub fn register_decoder(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: DecoderFactory,
    ) {
        self.decoders.push(DecoderEntry {
            codec_id,
            name: name.into(),
            factory,
        });
    }

    /// 注册一个解析器, 同一 `CodecId` 重复注册时后者覆盖前者
    pub fn register_parser(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: ParserFactory,
    ) {
        self.parsers.insert(
            codec_id,
            ParserEntry {
                name: name.into(),
                factory,
            },
        );
    }

    /// 按名称查找解码器
    pub fn find_decoder_by_name(&self, name: &str) -> Option<&DecoderEntry> {
        self.decoders.iter().find(|entry| entry.name == name)
    }

    /// 按名称创建解码器实例
    pub fn create_decoder_by_name(&self, name: &str) -> MediaResult<Box<dyn Decoder>> {
        let entry = self
            .find_decoder_by_name(name)
            .ok_or_else(|| MediaError::CodecNotFound(name.to_string()))?;
        entry.create()
    }

    /// 创建指定编解码器 ID 的解析器实例
    pub fn create_parser(&self, codec_id: CodecId) -> MediaResult<Box<dyn Parser>> {
        let entry = self
            .parsers
            .get(&codec_id)
            .ok_or_else(|| MediaError::ParserNotFound(codec_id.to_string()))?;
        Ok((entry.factory)())
    }

    /// 获取所有已注册的解码器 (按注册顺序)
    pub fn list_decoders(&self) -> Vec<(CodecId, &str)> {
        self.decoders
            .iter()
            .map(|entry| (entry.codec_id, entry.name.as_str()))
            .collect()
    }

    /// 获取所有已注册的解析器 (按名称排序)
    pub fn list_parsers(&self) -> Vec<(CodecId, &str)> {
        let mut result: Vec<(CodecId, &str)> = self
            .parsers
            .iter()
            .map(|(id, entry)| (*id, entry.name.as_str()))
            .collect();
        result.sort_by(|a, b| a.1.cmp(b.1));
        result
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_parsers() {
        let mut registry = CodecRegistry::new();
        crate::register_all(&mut registry);

        let parsers = registry.list_parsers();
        let ids: Vec<CodecId> = parsers.iter().map(|(id, _)| *id).collect();
        for id in [
            CodecId::H264,
            CodecId::H265,
            CodecId::Mpeg4,
            CodecId::Mp1,
            CodecId::Mp2,
            CodecId::Mp3,
        ] {
            assert!(ids.contains(&id), "缺少 {} 解析器", id);
        }
    }

    #[cfg(feature = "symphonia-backend")]
    #[test]
    fn test_create_decoder_by_name() {
        let mut registry = CodecRegistry::new();
        crate::register_all(&mut registry);

        for (name, id) in [
            ("mp1", CodecId::Mp1),
            ("mp2", CodecId::Mp2),
            ("mp3", CodecId::Mp3),
        ] {
            let entry = registry
                .find_decoder_by_name(name)
                .unwrap_or_else(|| panic!("未注册 {name} 解码器"));
            assert_eq!(entry.codec_id(), id);
            let dec = registry.create_decoder_by_name(name).unwrap();
            assert_eq!(dec.codec_id(), id);
        }
    }

    #[test]
    fn test_unknown_decoder_is_error() {
        let registry = CodecRegistry::new();
        assert!(registry.find_decoder_by_name("doesnotexist").is_none());
        assert!(matches!(
            registry.create_decoder_by_name("doesnotexist"),
            Err(MediaError::CodecNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_parser_is_error() {
        let registry = CodecRegistry::new();
        assert!(matches!(
            registry.create_parser(CodecId::H264),
            Err(MediaError::ParserNotFound(_))
        ));
    }

    #[test]
    fn test_同名解码器先注册者优先() {
        fn first() -> MediaResult<Box<dyn Decoder>> {
            Err(MediaError::Internal("first".into()))
        }
        fn second() -> MediaResult<Box<dyn Decoder>> {
            Err(MediaError::Internal("second".into()))
        }
        let mut registry = CodecRegistry::new();
        registry.register_decoder(CodecId::H264, "h264", first);
        registry.register_decoder(CodecId::H265, "h264", second);
        let entry = registry.find_decoder_by_name("h264").unwrap();
        assert_eq!(entry.codec_id(), CodecId::H264);
        match entry.create() {
            Err(MediaError::Internal(msg)) => assert_eq!(msg, "first"),
            _ => panic!("应调用先注册的工厂函数"),
        }
    }
}
