//! MPEG-1/2/2.5 Layer I/II/III 音频帧解析器.
//!
//! 按帧头计算帧长, 逐帧切分裸 MPEG 音频码流.
//! 开头的 ID3v2 标签与末尾的 ID3v1 (`TAG`) 标签被跳过.

use decbench_core::{MediaError, MediaResult};

use crate::codec_id::CodecId;
use crate::parser::Parser;

/// MPEG 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
}

/// MPEG Layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegLayer {
    Layer1,
    Layer2,
    Layer3,
}

/// MPEG 音频帧头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpegAudioHeader {
    pub version: MpegVersion,
    pub layer: MpegLayer,
    pub has_crc: bool,
    /// 码率 (bps)
    pub bitrate: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    pub padding: bool,
    /// 声道数
    pub channels: u32,
    /// 帧大小 (字节, 含帧头)
    pub frame_size: usize,
    /// 每声道采样数
    pub samples_per_frame: u32,
}

impl MpegAudioHeader {
    /// 解析 4 字节的帧头
    pub fn parse(header: u32) -> MediaResult<Self> {
        // AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
        // A: 同步字 (11 bits), B: 版本, C: Layer, D: CRC 保护 (0 表示有 CRC)
        // E: 码率索引, F: 采样率索引, G: 填充, I: 声道模式
        if (header & 0xFFE0_0000) != 0xFFE0_0000 {
            return Err(MediaError::InvalidData(format!(
                "无效的帧同步字: 0x{header:08X}"
            )));
        }

        let version = match (header >> 19) & 0x3 {
            3 => MpegVersion::Mpeg1,
            2 => MpegVersion::Mpeg2,
            0 => MpegVersion::Mpeg25,
            _ => return Err(MediaError::InvalidData("保留的 MPEG 版本".into())),
        };

        let layer = match (header >> 17) & 0x3 {
            3 => MpegLayer::Layer1,
            2 => MpegLayer::Layer2,
            1 => MpegLayer::Layer3,
            _ => return Err(MediaError::InvalidData("保留的 MPEG Layer".into())),
        };

        let has_crc = (header >> 16) & 0x1 == 0;

        let bitrate_idx = ((header >> 12) & 0xF) as usize;
        if bitrate_idx == 0 || bitrate_idx == 15 {
            // 0 为 free format, 无法从帧头推出帧长
            return Err(MediaError::InvalidData(format!(
                "不支持的码率索引: {bitrate_idx}"
            )));
        }

        let sample_rate_idx = ((header >> 10) & 0x3) as usize;
        if sample_rate_idx == 3 {
            return Err(MediaError::InvalidData("保留的采样率索引".into()));
        }

        let padding = (header >> 9) & 0x1 == 1;
        let channels = if (header >> 6) & 0x3 == 3 { 1 } else { 2 };

        let bitrate = lookup_bitrate(version, layer, bitrate_idx) * 1000;
        let sample_rate = lookup_sample_rate(version, sample_rate_idx);
        let pad = u32::from(padding);

        let (frame_size, samples_per_frame) = match (layer, version) {
            (MpegLayer::Layer1, _) => ((12 * bitrate / sample_rate + pad) * 4, 384),
            (MpegLayer::Layer2, _) => (144 * bitrate / sample_rate + pad, 1152),
            (MpegLayer::Layer3, MpegVersion::Mpeg1) => (144 * bitrate / sample_rate + pad, 1152),
            (MpegLayer::Layer3, _) => (72 * bitrate / sample_rate + pad, 576),
        };

        Ok(Self {
            version,
            layer,
            has_crc,
            bitrate,
            sample_rate,
            padding,
            channels,
            frame_size: frame_size as usize,
            samples_per_frame,
        })
    }
}

fn lookup_bitrate(version: MpegVersion, layer: MpegLayer, index: usize) -> u32 {
    // kbps
    const V1_L1: [u32; 15] = [
        0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448,
    ];
    const V1_L2: [u32; 15] = [
        0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384,
    ];
    const V1_L3: [u32; 15] = [
        0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
    ];
    const V2_L1: [u32; 15] = [
        0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256,
    ];
    const V2_L23: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

    match (version, layer) {
        (MpegVersion::Mpeg1, MpegLayer::Layer1) => V1_L1[index],
        (MpegVersion::Mpeg1, MpegLayer::Layer2) => V1_L2[index],
        (MpegVersion::Mpeg1, MpegLayer::Layer3) => V1_L3[index],
        (_, MpegLayer::Layer1) => V2_L1[index],
        (_, _) => V2_L23[index],
    }
}

fn lookup_sample_rate(version: MpegVersion, index: usize) -> u32 {
    match version {
        MpegVersion::Mpeg1 => [44100, 48000, 32000][index],
        MpegVersion::Mpeg2 => [22050, 24000, 16000][index],
        MpegVersion::Mpeg25 => [11025, 12000, 8000][index],
    }
}

/// ID3v2 标签头长度
const ID3V2_HEADER_SIZE: usize = 10;

/// 解析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// 收集 4 字节帧头
    Header,
    /// 收集 10 字节 ID3v2 标签头
    Id3Header,
    /// 跳过标签剩余字节
    SkipTag(usize),
    /// 收集整帧
    Frame(usize),
    /// 遇到 ID3v1 标签, 忽略之后的所有数据
    Trailer,
}

/// MPEG 音频码流解析器
pub struct MpegAudioParser {
    codec_id: CodecId,
    state: State,
    /// 当前帧 (或标签头) 已收集的字节
    pending: Vec<u8>,
    /// 最近一次产出的帧
    output: Vec<u8>,
    /// 已产出的帧数
    frames: u64,
}

impl MpegAudioParser {
    /// 创建指定编解码器的解析器
    pub fn new(codec_id: CodecId) -> Self {
        Self {
            codec_id,
            state: State::Header,
            pending: Vec::with_capacity(4096),
            output: Vec::with_capacity(4096),
            frames: 0,
        }
    }

    pub fn create_mp1() -> Box<dyn Parser> {
        Box::new(Self::new(CodecId::Mp1))
    }

    pub fn create_mp2() -> Box<dyn Parser> {
        Box::new(Self::new(CodecId::Mp2))
    }

    pub fn create_mp3() -> Box<dyn Parser> {
        Box::new(Self::new(CodecId::Mp3))
    }

    /// 把 `pending` 补齐到 `target` 字节, 返回本次取用的字节数
    fn fill(&mut self, data: &[u8], target: usize) -> usize {
        let take = target.saturating_sub(self.pending.len()).min(data.len());
        self.pending.extend_from_slice(&data[..take]);
        take
    }

    fn on_header(&mut self) -> MediaResult<()> {
        if self.pending.starts_with(b"ID3") {
            self.state = State::Id3Header;
            return Ok(());
        }
        if self.pending.starts_with(b"TAG") {
            log::debug!("{}: 遇到 ID3v1 标签, 忽略剩余数据", self.codec_id);
            self.pending.clear();
            self.state = State::Trailer;
            return Ok(());
        }

        let word = u32::from_be_bytes([
            self.pending[0],
            self.pending[1],
            self.pending[2],
            self.pending[3],
        ]);
        let header = MpegAudioHeader::parse(word).map_err(|e| {
            MediaError::InvalidData(format!(
                "{}: 第 {} 帧处失去同步: {e}",
                self.codec_id, self.frames
            ))
        })?;
        self.state = State::Frame(header.frame_size);
        Ok(())
    }

    fn on_id3_header(&mut self) -> MediaResult<()> {
        let size_bytes = &self.pending[6..10];
        if size_bytes.iter().any(|b| b & 0x80 != 0) {
            return Err(MediaError::InvalidData("ID3v2 标签长度字段非法".into()));
        }
        let size = size_bytes
            .iter()
            .fold(0usize, |acc, &b| (acc << 7) | usize::from(b));
        let footer = if self.pending[5] & 0x10 != 0 {
            ID3V2_HEADER_SIZE
        } else {
            0
        };
        log::debug!("{}: 跳过 ID3v2 标签, {} 字节", self.codec_id, size + footer);
        self.pending.clear();
        self.state = State::SkipTag(size + footer);
        Ok(())
    }
}

impl Parser for MpegAudioParser {
    fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    fn name(&self) -> &str {
        "mpegaudio"
    }

    fn parse(&mut self, data: &[u8]) -> MediaResult<(usize, Option<&[u8]>)> {
        let mut pos = 0;
        loop {
            match self.state {
                State::Header => {
                    pos += self.fill(&data[pos..], 4);
                    if self.pending.len() < 4 {
                        return Ok((pos, None));
                    }
                    self.on_header()?;
                }
                State::Id3Header => {
                    pos += self.fill(&data[pos..], ID3V2_HEADER_SIZE);
                    if self.pending.len() < ID3V2_HEADER_SIZE {
                        return Ok((pos, None));
                    }
                    self.on_id3_header()?;
                }
                State::SkipTag(remaining) => {
                    let take = remaining.min(data.len() - pos);
                    pos += take;
                    if take < remaining {
                        self.state = State::SkipTag(remaining - take);
                        return Ok((pos, None));
                    }
                    self.state = State::Header;
                }
                State::Frame(size) => {
                    pos += self.fill(&data[pos..], size);
                    if self.pending.len() < size {
                        return Ok((pos, None));
                    }
                    std::mem::swap(&mut self.pending, &mut self.output);
                    self.pending.clear();
                    self.state = State::Header;
                    self.frames += 1;
                    return Ok((pos, Some(self.output.as_slice())));
                }
                State::Trailer => return Ok((data.len(), None)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::tests_util::parse_all;

    /// MPEG-1 Layer III, 128 kbps, 44100 Hz, 无填充: 417 字节
    fn mp3_frame(fill: u8) -> Vec<u8> {
        let mut frame = vec![fill; 417];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x04]);
        frame
    }

    #[test]
    fn test_parse_header() {
        let header = MpegAudioHeader::parse(0xFFFB_9004).unwrap();
        assert_eq!(header.version, MpegVersion::Mpeg1);
        assert_eq!(header.layer, MpegLayer::Layer3);
        assert_eq!(header.bitrate, 128_000);
        assert_eq!(header.sample_rate, 44100);
        assert_eq!(header.frame_size, 417);
        assert_eq!(header.samples_per_frame, 1152);
        assert_eq!(header.channels, 2);
        assert!(!header.has_crc);

        // 带填充
        assert_eq!(MpegAudioHeader::parse(0xFFFB_9204).unwrap().frame_size, 418);
    }

    #[test]
    fn test_frame_size_per_layer() {
        // MPEG-1 Layer I, 384 kbps, 48000 Hz: (12*384000/48000)*4 = 384
        assert_eq!(MpegAudioHeader::parse(0xFFFF_C400).unwrap().frame_size, 384);
        // MPEG-1 Layer II, 192 kbps, 48000 Hz: 144*192000/48000 = 576
        let l2 = MpegAudioHeader::parse(0xFFFD_A400).unwrap();
        assert_eq!(l2.layer, MpegLayer::Layer2);
        assert_eq!(l2.frame_size, 576);
        // MPEG-2 Layer III, 64 kbps, 22050 Hz, 单声道: 72*64000/22050 = 208
        let v2 = MpegAudioHeader::parse(0xFFF3_80C0).unwrap();
        assert_eq!(v2.version, MpegVersion::Mpeg2);
        assert_eq!(v2.frame_size, 208);
        assert_eq!(v2.samples_per_frame, 576);
        assert_eq!(v2.channels, 1);
    }

    #[test]
    fn test_invalid_headers() {
        assert!(MpegAudioHeader::parse(0x1234_5678).is_err());
        // 码率索引 15
        assert!(MpegAudioHeader::parse(0xFFFB_F004).is_err());
        // 采样率索引 3
        assert!(MpegAudioHeader::parse(0xFFFB_9C04).is_err());
        // 保留版本
        assert!(MpegAudioHeader::parse(0xFFEB_9004).is_err());
    }

    #[test]
    fn test_split_frames() {
        let data: Vec<u8> = (0..10).flat_map(|_| mp3_frame(0)).collect();
        for chunk_size in [1, 3, 7, 4096] {
            let mut parser = MpegAudioParser::new(CodecId::Mp3);
            let units = parse_all(&mut parser, &data, chunk_size).unwrap();
            assert_eq!(units.len(), 10, "chunk_size={chunk_size}");
            assert!(units.iter().all(|u| *u == mp3_frame(0)));
        }
    }

    #[test]
    fn test_末尾不完整帧被丢弃() {
        let mut data: Vec<u8> = (0..3).flat_map(|_| mp3_frame(0)).collect();
        data.extend_from_slice(&mp3_frame(0)[..100]);
        let units = parse_all(&mut MpegAudioParser::new(CodecId::Mp3), &data, 64).unwrap();
        assert_eq!(units.len(), 3);
    }

    #[test]
    fn test_skip_id3_tags() {
        // ID3v2.4, 标签体 20 字节 (syncsafe 编码)
        let mut data = vec![b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 20];
        data.extend(std::iter::repeat_n(0xFF, 20));
        data.extend(mp3_frame(0));
        data.extend(mp3_frame(0));
        data.extend_from_slice(b"TAG");
        data.extend(std::iter::repeat_n(b' ', 125));
        for chunk_size in [1, 5, 4096] {
            let units =
                parse_all(&mut MpegAudioParser::new(CodecId::Mp3), &data, chunk_size).unwrap();
            assert_eq!(units.len(), 2, "chunk_size={chunk_size}");
        }
    }

    #[test]
    fn test_失去同步返回错误() {
        let mut data = mp3_frame(0);
        data.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44]);
        let err = parse_all(&mut MpegAudioParser::new(CodecId::Mp3), &data, 4096).unwrap_err();
        assert!(format!("{err}").contains("第 1 帧"));
    }
}
