//! 分块读取输入.
//!
//! 对标 `fread`: 每次尽量填满一个固定大小的块, 短读会继续读取,
//! 直到块填满或到达流末尾.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::PipelineError;

/// 默认块大小 (4 KB)
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// 输入缓冲区末尾的零填充字节数
///
/// 解析器只会看到有效前缀, 填充区保证越界预读时读到的是 0.
pub const INPUT_PADDING_SIZE: usize = 64;

/// 可复用的原始输入缓冲区
///
/// 容量为块大小加上 [`INPUT_PADDING_SIZE`], 填充区只在分配时清零一次.
pub struct RawBuffer {
    data: Vec<u8>,
    chunk_size: usize,
}

impl RawBuffer {
    /// 分配缓冲区, `chunk_size` 至少为 1
    pub fn new(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            data: vec![0u8; chunk_size + INPUT_PADDING_SIZE],
            chunk_size,
        }
    }

    /// 块大小
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// 可写入的块区域 (不含填充)
    pub fn chunk_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.chunk_size]
    }

    /// 有效数据 `[..len]`
    pub fn valid(&self, len: usize) -> &[u8] {
        &self.data[..len.min(self.chunk_size)]
    }
}

/// 分块读取器
pub struct ChunkReader<R> {
    inner: R,
    /// 已读取的总字节数
    bytes_read: u64,
    /// 已读取的非空块数
    chunks_read: u64,
}

impl ChunkReader<File> {
    /// 以只读方式打开文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PipelineError::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("打开输入文件: {}", path.display());
        Ok(Self::new(file))
    }
}

impl<R: Read> ChunkReader<R> {
    /// 包装任意读取源
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
            chunks_read: 0,
        }
    }

    /// 读取一块数据, 返回填充的字节数, 0 表示到达流末尾
    ///
    /// 短读与 `Interrupted` 会重试, 其他读取错误直接返回.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        if filled > 0 {
            self.bytes_read += filled as u64;
            self.chunks_read += 1;
        }
        Ok(filled)
    }

    /// 已读取的总字节数
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// 已读取的块数
    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }
}
