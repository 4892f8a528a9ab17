//! 码流解析器 trait 定义.
//!
//! 对标 FFmpeg 的 `av_parser_parse2`: 把任意长度的原始字节流增量地切分为
//! 编解码器可以单独接受的编码单元, 跨输入块保留未完成单元的状态.

use decbench_core::MediaResult;

use crate::codec_id::CodecId;

/// 码流解析器 trait
pub trait Parser: Send {
    /// 解析器对应的编解码器
    fn codec_id(&self) -> CodecId;

    /// 解析器名称
    fn name(&self) -> &str;

    /// 增量解析一段输入
    ///
    /// 每次调用消耗 `data` 的前 `n` 个字节 (`0 <= n <= data.len()`),
    /// 并可能产出一个完整的编码单元. 调用方需要用剩余字节反复调用,
    /// 直到整块输入被消耗完.
    ///
    /// # 返回
    /// - `Ok((n, Some(unit)))`: 消耗 n 字节并产出一个编码单元.
    ///   单元借用解析器内部缓冲区, 在下一次调用前有效.
    /// - `Ok((n, None))`: 消耗 n 字节, 数据已缓存, 尚无完整单元
    /// - `Err(_)`: 码流损坏或无法识别
    ///
    /// 输入结束时不需要刷新解析器: 末尾未结束的单元会被丢弃.
    fn parse(&mut self, data: &[u8]) -> MediaResult<(usize, Option<&[u8]>)>;
}
