//! H.265/HEVC Annex B 访问单元解析器.
//!
//! # NAL 头部 (2 字节)
//! ```text
//! forbidden(1) | nal_unit_type(6) | nuh_layer_id(6) | temporal_id_plus1(3)
//! ```

use decbench_core::{MediaError, MediaResult};

use super::start_code::{Boundary, StartCodeSplitter, UnitBoundary};
use crate::codec_id::CodecId;
use crate::parser::Parser;

/// HEVC NAL 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HevcNalUnitType {
    /// VCL NAL (0..=31, 含保留类型)
    Vcl(u8),
    /// VPS (Video Parameter Set)
    Vps,
    /// SPS (Sequence Parameter Set)
    Sps,
    /// PPS (Picture Parameter Set)
    Pps,
    /// AUD (Access Unit Delimiter)
    Aud,
    /// EOS (End of Sequence)
    Eos,
    /// EOB (End of Bitstream)
    Eob,
    /// FD (Filler Data)
    FillerData,
    /// PREFIX_SEI
    PrefixSei,
    /// SUFFIX_SEI
    SuffixSei,
    /// 保留或未指定类型
    Other(u8),
}

impl HevcNalUnitType {
    /// 从 NAL 头部第一个字节解析类型
    pub fn from_header(header: u8) -> Self {
        match (header >> 1) & 0x3F {
            id @ 0..=31 => Self::Vcl(id),
            32 => Self::Vps,
            33 => Self::Sps,
            34 => Self::Pps,
            35 => Self::Aud,
            36 => Self::Eos,
            37 => Self::Eob,
            38 => Self::FillerData,
            39 => Self::PrefixSei,
            40 => Self::SuffixSei,
            other => Self::Other(other),
        }
    }

    /// 是否为 VCL NAL
    pub fn is_vcl(&self) -> bool {
        matches!(self, Self::Vcl(_))
    }

    /// 是否为已定义的切片类型, 保留的 VCL 类型 (10..=15, 22..=31) 没有可读的切片头
    pub fn has_slice_header(&self) -> bool {
        matches!(self, Self::Vcl(0..=9 | 16..=21))
    }

    /// 出现在 VCL 之后时是否开始新的访问单元 (H.265 7.4.2.4.4)
    pub fn starts_access_unit(&self) -> bool {
        match self {
            Self::Vps | Self::Sps | Self::Pps | Self::Aud | Self::PrefixSei => true,
            Self::Other(id) => matches!(id, 41..=44 | 48..=55),
            _ => false,
        }
    }
}

#[derive(Default)]
struct HevcBoundary {
    seen_vcl: bool,
}

impl UnitBoundary for HevcBoundary {
    fn classify(&mut self, header: &[u8]) -> MediaResult<Boundary> {
        if header.len() < 2 {
            return Ok(Boundary::NeedMore);
        }
        if header[0] & 0x80 != 0 {
            return Err(MediaError::InvalidData(format!(
                "HEVC: forbidden_zero_bit 非零, NAL 头部=0x{:02X}{:02X}",
                header[0], header[1]
            )));
        }

        let nal_type = HevcNalUnitType::from_header(header[0]);
        if nal_type.has_slice_header() {
            let Some(&slice_byte) = header.get(2) else {
                return Ok(Boundary::NeedMore);
            };
            let first_slice_in_pic = slice_byte & 0x80 != 0;
            if self.seen_vcl && first_slice_in_pic {
                return Ok(Boundary::NewUnit { header_len: 3 });
            }
            self.seen_vcl = true;
            return Ok(Boundary::Continue);
        }

        if nal_type.is_vcl() {
            return Ok(Boundary::Continue);
        }
        if self.seen_vcl && nal_type.starts_access_unit() {
            return Ok(Boundary::NewUnit { header_len: 2 });
        }
        Ok(Boundary::Continue)
    }

    fn reset(&mut self) {
        self.seen_vcl = false;
    }
}

/// HEVC Annex B 码流解析器
pub struct HevcParser {
    splitter: StartCodeSplitter<HevcBoundary>,
}

impl HevcParser {
    /// 创建解析器
    pub fn new() -> Self {
        Self {
            splitter: StartCodeSplitter::new("HEVC", HevcBoundary::default()),
        }
    }

    /// 工厂函数 (用于注册表)
    pub fn create() -> Box<dyn Parser> {
        Box::new(Self::new())
    }
}

impl Default for HevcParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for HevcParser {
    fn codec_id(&self) -> CodecId {
        CodecId::H265
    }

    fn name(&self) -> &str {
        "hevc"
    }

    fn parse(&mut self, data: &[u8]) -> MediaResult<(usize, Option<&[u8]>)> {
        self.splitter.split(data)
    }
}
