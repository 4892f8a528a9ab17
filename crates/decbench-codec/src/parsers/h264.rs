//! H.264 Annex B 访问单元解析器.
//!
//! # NAL 头部 (1 字节)
//! ```text
//! ┌─────────────────────────────────────┐
//! │ forbidden(1) | ref_idc(2) | type(5) │
//! └─────────────────────────────────────┘
//! ```
//!
//! 访问单元在以下位置开始 (H.264 7.4.1.2.3):
//! - 已有 VCL 后遇到 `first_mb_in_slice == 0` 的切片
//! - 已有 VCL 后遇到 SEI/SPS/PPS/AUD 或 14..=18 类型的 NAL

use decbench_core::{MediaError, MediaResult};

use super::start_code::{Boundary, StartCodeSplitter, UnitBoundary};
use crate::codec_id::CodecId;
use crate::parser::Parser;

/// NAL 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NalUnitType {
    /// 非 IDR 图像切片 (P/B slice)
    Slice,
    /// 数据分区 A (DPA)
    SliceDpa,
    /// 数据分区 B (DPB)
    SliceDpb,
    /// 数据分区 C (DPC)
    SliceDpc,
    /// IDR 图像切片 (关键帧)
    SliceIdr,
    /// 增补增强信息 (SEI)
    Sei,
    /// 序列参数集 (SPS)
    Sps,
    /// 图像参数集 (PPS)
    Pps,
    /// 访问单元分隔符 (AUD)
    Aud,
    /// 序列结束
    EndOfSequence,
    /// 流结束
    EndOfStream,
    /// 填充数据
    FillerData,
    /// 其他类型
    Other(u8),
}

impl NalUnitType {
    /// 从 NAL 头部字节解析类型
    pub fn from_header(header: u8) -> Self {
        match header & 0x1F {
            1 => Self::Slice,
            2 => Self::SliceDpa,
            3 => Self::SliceDpb,
            4 => Self::SliceDpc,
            5 => Self::SliceIdr,
            6 => Self::Sei,
            7 => Self::Sps,
            8 => Self::Pps,
            9 => Self::Aud,
            10 => Self::EndOfSequence,
            11 => Self::EndOfStream,
            12 => Self::FillerData,
            other => Self::Other(other),
        }
    }

    /// 是否携带切片头 (可读出 `first_mb_in_slice`)
    pub fn has_slice_header(&self) -> bool {
        matches!(self, Self::Slice | Self::SliceDpa | Self::SliceIdr)
    }

    /// 出现在 VCL 之后时是否开始新的访问单元
    pub fn starts_access_unit(&self) -> bool {
        match self {
            Self::Sei | Self::Sps | Self::Pps | Self::Aud => true,
            Self::Other(id) => (14..=18).contains(id),
            _ => false,
        }
    }
}

/// H.264 访问单元边界判定
#[derive(Default)]
struct H264Boundary {
    /// 当前访问单元中是否已有切片
    seen_vcl: bool,
}

impl UnitBoundary for H264Boundary {
    fn classify(&mut self, header: &[u8]) -> MediaResult<Boundary> {
        let Some(&nal_header) = header.first() else {
            return Ok(Boundary::NeedMore);
        };
        if nal_header & 0x80 != 0 {
            return Err(MediaError::InvalidData(format!(
                "H.264: forbidden_zero_bit 非零, NAL 头部=0x{nal_header:02X}"
            )));
        }

        let nal_type = NalUnitType::from_header(nal_header);
        if nal_type.has_slice_header() {
            let Some(&slice_byte) = header.get(1) else {
                return Ok(Boundary::NeedMore);
            };
            // first_mb_in_slice 为 ue(v), 首比特为 1 时取值为 0
            let first_mb_zero = slice_byte & 0x80 != 0;
            if self.seen_vcl && first_mb_zero {
                return Ok(Boundary::NewUnit { header_len: 2 });
            }
            self.seen_vcl = true;
            return Ok(Boundary::Continue);
        }

        if self.seen_vcl && nal_type.starts_access_unit() {
            return Ok(Boundary::NewUnit { header_len: 1 });
        }
        Ok(Boundary::Continue)
    }

    fn reset(&mut self) {
        self.seen_vcl = false;
    }
}

/// H.264 Annex B 码流解析器
pub struct H264Parser {
    splitter: StartCodeSplitter<H264Boundary>,
}

impl H264Parser {
    /// 创建解析器
    pub fn new() -> Self {
        Self {
            splitter: StartCodeSplitter::new("H.264", H264Boundary::default()),
        }
    }

    /// 工厂函数 (用于注册表)
    pub fn create() -> Box<dyn Parser> {
        Box::new(Self::new())
    }
}

impl Default for H264Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for H264Parser {
    fn codec_id(&self) -> CodecId {
        CodecId::H264
    }

    fn name(&self) -> &str {
        "h264"
    }

    fn parse(&mut self, data: &[u8]) -> MediaResult<(usize, Option<&[u8]>)> {
        self.splitter.split(data)
    }
}
