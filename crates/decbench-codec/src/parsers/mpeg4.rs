//! MPEG-4 Part 2 (Visual) 码流解析器.
//!
//! 从原始 .m4v 字节流中切分出完整的 VOP 包: VOS/VO/VOL/GOV 等头部
//! 并入其后第一个 VOP 所在的单元.

use decbench_core::MediaResult;

use super::start_code::{Boundary, StartCodeSplitter, UnitBoundary};
use crate::codec_id::CodecId;
use crate::parser::Parser;

/// MPEG-4 Part 2 起始码类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mpeg4StartCodeType {
    /// 视频对象 (Video Object, 0x00-0x1F)
    VideoObject(u8),
    /// 视频对象层 (Video Object Layer, 0x20-0x2F)
    VideoObjectLayer(u8),
    /// 视觉对象序列起始 (0xB0)
    VisualObjectSequenceStart,
    /// 视觉对象序列结束 (0xB1)
    VisualObjectSequenceEnd,
    /// 用户数据 (0xB2)
    UserData,
    /// 组头 (Group of VOP, 0xB3)
    GroupOfVop,
    /// 视觉对象 (0xB5)
    VisualObject,
    /// VOP 起始码 (0xB6)
    Vop,
    /// 其他起始码
    Other(u8),
}

impl Mpeg4StartCodeType {
    /// 从起始码字节识别类型
    pub fn from_byte(code: u8) -> Self {
        match code {
            0x00..=0x1F => Self::VideoObject(code),
            0x20..=0x2F => Self::VideoObjectLayer(code - 0x20),
            0xB0 => Self::VisualObjectSequenceStart,
            0xB1 => Self::VisualObjectSequenceEnd,
            0xB2 => Self::UserData,
            0xB3 => Self::GroupOfVop,
            0xB5 => Self::VisualObject,
            0xB6 => Self::Vop,
            other => Self::Other(other),
        }
    }
}

#[derive(Default)]
struct Mpeg4Boundary {
    /// 当前单元中是否已有 VOP
    seen_vop: bool,
}

impl UnitBoundary for Mpeg4Boundary {
    fn classify(&mut self, header: &[u8]) -> MediaResult<Boundary> {
        let Some(&code) = header.first() else {
            return Ok(Boundary::NeedMore);
        };
        match Mpeg4StartCodeType::from_byte(code) {
            Mpeg4StartCodeType::VisualObjectSequenceEnd => Ok(Boundary::Continue),
            _ if self.seen_vop => Ok(Boundary::NewUnit { header_len: 1 }),
            Mpeg4StartCodeType::Vop => {
                self.seen_vop = true;
                Ok(Boundary::Continue)
            }
            _ => Ok(Boundary::Continue),
        }
    }

    fn reset(&mut self) {
        self.seen_vop = false;
    }
}

/// MPEG-4 Part 2 码流解析器
pub struct Mpeg4Parser {
    splitter: StartCodeSplitter<Mpeg4Boundary>,
}

impl Mpeg4Parser {
    /// 创建解析器
    pub fn new() -> Self {
        Self {
            splitter: StartCodeSplitter::new("MPEG-4", Mpeg4Boundary::default()),
        }
    }

    /// 工厂函数 (用于注册表)
    pub fn create() -> Box<dyn Parser> {
        Box::new(Self::new())
    }
}

impl Default for Mpeg4Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for Mpeg4Parser {
    fn codec_id(&self) -> CodecId {
        CodecId::Mpeg4
    }

    fn name(&self) -> &str {
        "mpeg4video"
    }

    fn parse(&mut self, data: &[u8]) -> MediaResult<(usize, Option<&[u8]>)> {
        self.splitter.split(data)
    }
}
