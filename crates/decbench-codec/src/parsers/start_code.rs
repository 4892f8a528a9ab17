//! 起始码分隔码流的增量切分器.
//!
//! H.264/HEVC Annex B 与 MPEG-4 Part 2 都使用 `00 00 01` 起始码分隔语法单元.
//! 本模块负责跨输入块扫描起始码并缓存未完成的访问单元,
//! 访问单元的边界判定交给各编解码器的 [`UnitBoundary`] 实现.
//!
//! ```text
//! pending: [00 00 01 67 ..] [00 00 01 68 ..] [00 00 01 65 ..] [00 00 00 01 41 ..]
//!          |<------------- 当前访问单元 ------------------>|  ^ 边界 (start)
//! ```

use decbench_core::{MediaError, MediaResult};

/// 起始码之后头部字节的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// 头部字节不足, 需要更多输入
    NeedMore,
    /// 属于当前访问单元
    Continue,
    /// 开始新的访问单元, `header_len` 为判定所用的头部字节数
    NewUnit { header_len: usize },
}

/// 访问单元边界判定
pub(crate) trait UnitBoundary: Send {
    /// 判定一个起始码 (不含 `00 00 01`) 是否开始新的访问单元
    ///
    /// 返回 `Continue` 时需要更新内部状态 (如已见到 VCL).
    fn classify(&mut self, header: &[u8]) -> MediaResult<Boundary>;

    /// 开始新的访问单元时重置状态
    fn reset(&mut self);
}

/// 起始码切分器
pub(crate) struct StartCodeSplitter<B> {
    /// 边界判定
    boundary: B,
    /// 用于错误信息的码流名称
    label: &'static str,
    /// 当前未完成的访问单元
    pending: Vec<u8>,
    /// 最近一次产出的访问单元
    output: Vec<u8>,
    /// 下一次扫描起始码的位置
    scan_pos: usize,
    /// 是否已找到第一个起始码
    synced: bool,
    /// 第一个起始码之前的 0x00 个数
    leading_zeros: usize,
}

impl<B: UnitBoundary> StartCodeSplitter<B> {
    pub(crate) fn new(label: &'static str, boundary: B) -> Self {
        Self {
            boundary,
            label,
            pending: Vec::with_capacity(64 * 1024),
            output: Vec::with_capacity(64 * 1024),
            scan_pos: 0,
            synced: false,
            leading_zeros: 0,
        }
    }

    /// 增量切分, 语义见 [`crate::Parser::parse`]
    pub(crate) fn split(&mut self, data: &[u8]) -> MediaResult<(usize, Option<&[u8]>)> {
        let mut skip = 0;
        if !self.synced {
            match self.sync(data)? {
                Some(n) => skip = n,
                None => return Ok((data.len(), None)),
            }
        }

        let rest = &data[skip..];
        let old_len = self.pending.len();

        // 先拼接少量字节, 处理跨块的起始码与头部
        let bridge = rest.len().min(BRIDGE_LEN);
        self.pending.extend_from_slice(&rest[..bridge]);
        let next = match scan(&mut self.boundary, &self.pending, self.scan_pos)? {
            Scan::Found { start, end } => return Ok(self.emit(skip, old_len, start, end)),
            Scan::Pending(next) => next,
        };
        if bridge == rest.len() {
            self.scan_pos = next;
            return Ok((data.len(), None));
        }
        self.pending.truncate(old_len);

        if next <= old_len {
            self.pending.extend_from_slice(rest);
            return match scan(&mut self.boundary, &self.pending, next)? {
                Scan::Found { start, end } => Ok(self.emit(skip, old_len, start, end)),
                Scan::Pending(next) => {
                    self.scan_pos = next;
                    Ok((data.len(), None))
                }
            };
        }

        // 其余部分直接在输入上扫描, 只复制到判定边界为止
        match scan(&mut self.boundary, rest, next - old_len)? {
            Scan::Found { start, end } => {
                self.pending.extend_from_slice(&rest[..end]);
                Ok(self.emit(skip, old_len, old_len + start, old_len + end))
            }
            Scan::Pending(next) => {
                self.pending.extend_from_slice(rest);
                self.scan_pos = old_len + next;
                Ok((data.len(), None))
            }
        }
    }

    /// 输出 `pending[..start]`, 保留 `[start, end)` 作为下一单元的开头
    fn emit(
        &mut self,
        skip: usize,
        old_len: usize,
        start: usize,
        end: usize,
    ) -> (usize, Option<&[u8]>) {
        let keep = end.max(old_len);
        self.pending.truncate(keep);
        let consumed = skip + (keep - old_len);

        self.output.clear();
        self.output.extend_from_slice(&self.pending[..start]);
        self.pending.drain(..start);
        self.scan_pos = 0;
        self.boundary.reset();

        (consumed, Some(self.output.as_slice()))
    }

    /// 跳过码流开头的 0x00 填充, 定位第一个起始码
    ///
    /// 返回第一个起始码之后的偏移; 输入耗尽仍未找到时返回 `None`.
    fn sync(&mut self, data: &[u8]) -> MediaResult<Option<usize>> {
        for (i, &byte) in data.iter().enumerate() {
            match byte {
                0x00 => self.leading_zeros += 1,
                0x01 if self.leading_zeros >= 2 => {
                    self.synced = true;
                    if self.leading_zeros >= 3 {
                        self.pending.push(0x00);
                    }
                    self.pending.extend_from_slice(&[0x00, 0x00, 0x01]);
                    return Ok(Some(i + 1));
                }
                _ => {
                    return Err(MediaError::InvalidData(format!(
                        "{}: 码流未以起始码开头, offset={}, byte=0x{:02X}",
                        self.label, self.leading_zeros, byte
                    )));
                }
            }
        }
        Ok(None)
    }
}

/// 每次调用先拼接到 `pending` 的最大字节数
const BRIDGE_LEN: usize = 64;

/// 一次扫描的结果
enum Scan {
    /// 找到边界: (边界起始码位置, 判定所需字节的末尾位置)
    Found { start: usize, end: usize },
    /// 未找到, 下次从该位置继续
    Pending(usize),
}

/// 从 `from` 开始在 `buf` 中查找下一个访问单元边界
fn scan<B: UnitBoundary>(boundary: &mut B, buf: &[u8], from: usize) -> MediaResult<Scan> {
    let mut i = from;
    while i + 3 <= buf.len() {
        if buf[i + 2] > 0x01 {
            i += 3;
            continue;
        }
        if buf[i] != 0x00 || buf[i + 1] != 0x00 || buf[i + 2] != 0x01 {
            i += 1;
            continue;
        }

        let header_start = i + 3;
        match boundary.classify(&buf[header_start..])? {
            Boundary::NeedMore => return Ok(Scan::Pending(i)),
            Boundary::Continue => i = header_start,
            Boundary::NewUnit { header_len } => {
                // 4 字节起始码的前导 0x00 归入新单元
                let start = if i > 0 && buf[i - 1] == 0x00 { i - 1 } else { i };
                return Ok(Scan::Found {
                    start,
                    end: header_start + header_len,
                });
            }
        }
    }
    Ok(Scan::Pending(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 每个起始码都开始新单元 (首个除外)
    struct EveryStartCode {
        seen: bool,
    }

    impl UnitBoundary for EveryStartCode {
        fn classify(&mut self, header: &[u8]) -> MediaResult<Boundary> {
            if header.is_empty() {
                return Ok(Boundary::NeedMore);
            }
            if self.seen {
                return Ok(Boundary::NewUnit { header_len: 1 });
            }
            self.seen = true;
            Ok(Boundary::Continue)
        }

        fn reset(&mut self) {
            self.seen = false;
        }
    }

    fn splitter() -> StartCodeSplitter<EveryStartCode> {
        StartCodeSplitter::new("test", EveryStartCode { seen: false })
    }

    fn split_all(
        splitter: &mut StartCodeSplitter<EveryStartCode>,
        data: &[u8],
        chunk_size: usize,
    ) -> Vec<Vec<u8>> {
        let mut units = Vec::new();
        for chunk in data.chunks(chunk_size) {
            let mut rest = chunk;
            while !rest.is_empty() {
                let (consumed, unit) = splitter.split(rest).unwrap();
                assert!(consumed <= rest.len());
                if let Some(unit) = unit {
                    units.push(unit.to_vec());
                }
                rest = &rest[consumed..];
            }
        }
        units
    }

    #[test]
    fn test_split_on_start_codes() {
        let data = [
            0x00, 0x00, 0x01, 0xA1, 0xA2, // 单元 1
            0x00, 0x00, 0x00, 0x01, 0xB1, // 单元 2 (4 字节起始码)
            0x00, 0x00, 0x01, 0xC1, 0xC2, 0xC3, // 单元 3 (末尾, 被丢弃)
        ];
        let units = split_all(&mut splitter(), &data, data.len());
        assert_eq!(units.len(), 2);
        assert_eq!(units[0], vec![0x00, 0x00, 0x01, 0xA1, 0xA2]);
        assert_eq!(units[1], vec![0x00, 0x00, 0x00, 0x01, 0xB1]);
    }

    #[test]
    fn test_chunk_size_does_not_change_units() {
        let mut data = Vec::new();
        for i in 0..20u8 {
            data.extend_from_slice(&[0x00, 0x00, 0x01, 0x10 + i]);
            data.extend(std::iter::repeat_n(0x80 | i, (i as usize) * 3 + 1));
        }
        let reference = split_all(&mut splitter(), &data, data.len());
        assert_eq!(reference.len(), 19);
        for chunk_size in [1, 2, 3, 5, 7, 64] {
            let units = split_all(&mut splitter(), &data, chunk_size);
            assert_eq!(units, reference, "chunk_size={chunk_size}");
        }
    }

    #[test]
    fn test_leading_zero_padding() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x01, 0xA1, 0x00, 0x00, 0x01, 0xB1];
        let units = split_all(&mut splitter(), &data, 1);
        assert_eq!(units, vec![vec![0x00, 0x00, 0x00, 0x01, 0xA1]]);
    }

    #[test]
    fn test_leading_four_byte_start_code_is_kept() {
        let data = [0x00, 0x00, 0x00, 0x01, 0xA1, 0xA2, 0x00, 0x00, 0x00, 0x01, 0xB1];
        for chunk_size in [1, 4, data.len()] {
            let units = split_all(&mut splitter(), &data, chunk_size);
            assert_eq!(units, vec![data[..6].to_vec()], "chunk_size={chunk_size}");
        }
    }

    #[test]
    fn test_large_chunk_does_not_buffer_whole_chunk() {
        let mut data = Vec::new();
        for i in 0..5_000u32 {
            data.extend_from_slice(&[0x00, 0x00, 0x01, 0x10]);
            data.extend_from_slice(&(i | 0x8080_8080).to_be_bytes());
            data.extend_from_slice(&[0x90; 200]);
        }
        let mut s = splitter();
        let (consumed, unit) = s.split(&data).unwrap();
        assert_eq!(unit.map(<[u8]>::len), Some(208));
        assert_eq!(consumed, 212);
        let (consumed, unit) = s.split(&data[212..]).unwrap();
        assert_eq!(unit.map(<[u8]>::len), Some(208));
        assert_eq!(consumed, 208);
        assert!(s.pending.capacity() < 128 * 1024);

        let reference = split_all(&mut splitter(), &data, 4096);
        assert_eq!(reference.len(), 4_999);
        assert_eq!(split_all(&mut splitter(), &data, data.len()), reference);
        assert_eq!(split_all(&mut splitter(), &data, 100), reference);
    }
}
