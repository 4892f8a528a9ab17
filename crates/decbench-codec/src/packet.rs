//! 压缩数据包 (Packet).
//!
//! 对标 FFmpeg 的 `AVPacket`, 承载一个由解析器切分出的编码单元.

use bytes::Bytes;

/// 压缩数据包
///
/// 一个 Packet 对应一个完整的编码单元 (一帧视频的访问单元, 或一帧音频).
/// 数据为空的 Packet 表示刷新 (flush), 见 [`Packet::empty`].
#[derive(Debug, Clone)]
pub struct Packet {
    /// 压缩数据
    pub data: Bytes,
}

impl Packet {
    /// 创建空数据包 (flush packet)
    pub fn empty() -> Self {
        Self { data: Bytes::new() }
    }

    /// 从数据创建数据包
    pub fn from_data(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// 复制借用的编码单元创建数据包
    pub fn copy_from_slice(unit: &[u8]) -> Self {
        Self::from_data(Bytes::copy_from_slice(unit))
    }

    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否为空包 (flush packet)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_packet_is_flush() {
        let pkt = Packet::empty();
        assert!(pkt.is_empty());
        assert_eq!(pkt.size(), 0);
    }

    #[test]
    fn test_复制编码单元() {
        let unit = [0x00, 0x00, 0x01, 0x65, 0x88];
        let pkt = Packet::copy_from_slice(&unit);
        assert_eq!(pkt.size(), 5);
        assert_eq!(&pkt.data[..], &unit);
    }
}
