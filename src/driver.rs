//! 解码流水线驱动.
//!
//! 把 [`ChunkReader`] → [`Parser`] → [`Decoder`] 串成一个循环:
//!
//! ```text
//! Init → Reading → (Parsing ⇄ Decoding) → Flushing → Done
//! ```
//!
//! - Reading: 读取一块数据, 长度为 0 时进入 Flushing
//! - Parsing: 解析器逐步消耗本块数据, 产出编码单元时进入 Decoding
//! - Decoding: 送入编码单元, 取空解码器输出, 回到 Parsing
//! - Flushing: 送入空包, 取空解码器输出
//!
//! 驱动以字段形式持有所有资源, 任何退出路径都按字段声明顺序释放.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use decbench_codec::{CodecParameters, CodecRegistry, Decoder, Packet, Parser};
use decbench_core::MediaError;
use serde::Serialize;

use crate::error::PipelineError;
use crate::reader::{ChunkReader, DEFAULT_CHUNK_SIZE, RawBuffer};

/// 流水线配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// 每次读取的块大小 (字节)
    pub chunk_size: usize,
    /// 解码器并行度提示, 0 表示由解码器决定
    pub thread_count: usize,
    /// 输入结束后是否刷新解码器
    pub flush_at_eof: bool,
}

impl PipelineOptions {
    /// 使用默认块大小创建配置
    pub fn new(thread_count: usize) -> Self {
        Self {
            thread_count,
            ..Self::default()
        }
    }

    /// 设置块大小
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// 设置是否在输入结束后刷新解码器
    pub fn with_flush_at_eof(mut self, flush_at_eof: bool) -> Self {
        self.flush_at_eof = flush_at_eof;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            thread_count: 0,
            flush_at_eof: true,
        }
    }
}

/// 流水线计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// 取出的解码帧数
    pub frames: u64,
    /// 送入的编码单元数
    pub units: u64,
    /// 读取的输入字节数
    pub bytes: u64,
    /// 读取的块数
    pub chunks: u64,
}

/// 驱动状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Init,
    Reading,
    Parsing,
    Decoding,
    Flushing,
    Done,
}

/// 解码流水线驱动
///
/// 资源释放顺序: 缓冲区, 输入, 解码器, 解析器 (与获取顺序相反).
pub struct PipelineDriver<R = File> {
    buffer: RawBuffer,
    reader: ChunkReader<R>,
    decoder: Box<dyn Decoder>,
    parser: Box<dyn Parser>,
    options: PipelineOptions,
    state: DriverState,
    /// 取出的解码帧数
    frames: u64,
    /// 送入的编码单元数
    units: u64,
}

impl PipelineDriver<File> {
    /// 按解码器名称初始化流水线
    ///
    /// 顺序: 查找解码器 → 查找解析器 → 分配解码器 → 打开解码器 → 打开输入文件.
    pub fn open(
        registry: &CodecRegistry,
        codec_name: &str,
        path: impl AsRef<Path>,
        options: PipelineOptions,
    ) -> Result<Self, PipelineError> {
        let entry = registry.find_decoder_by_name(codec_name).ok_or_else(|| {
            PipelineError::CodecNotFound {
                name: codec_name.to_string(),
            }
        })?;
        let codec_id = entry.codec_id();

        let parser = registry
            .create_parser(codec_id)
            .map_err(|source| PipelineError::ParserNotFound {
                codec: codec_id,
                source,
            })?;
        let mut decoder = entry
            .create()
            .map_err(|source| PipelineError::ContextAlloc { source })?;
        open_decoder(decoder.as_mut(), &options)?;

        let reader = ChunkReader::open(path)?;
        log::info!(
            "流水线就绪: decoder={}, parser={}, thread_count={}, chunk_size={}",
            decoder.name(),
            parser.name(),
            options.thread_count,
            options.chunk_size
        );
        Ok(Self::assemble(reader, parser, decoder, options))
    }
}

impl<R: Read> PipelineDriver<R> {
    /// 由已分配的组件组装流水线, 解码器在此打开
    pub fn from_parts(
        reader: ChunkReader<R>,
        parser: Box<dyn Parser>,
        mut decoder: Box<dyn Decoder>,
        options: PipelineOptions,
    ) -> Result<Self, PipelineError> {
        open_decoder(decoder.as_mut(), &options)?;
        Ok(Self::assemble(reader, parser, decoder, options))
    }

    fn assemble(
        reader: ChunkReader<R>,
        parser: Box<dyn Parser>,
        decoder: Box<dyn Decoder>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            buffer: RawBuffer::new(options.chunk_size),
            reader,
            decoder,
            parser,
            options,
            state: DriverState::Init,
            frames: 0,
            units: 0,
        }
    }

    /// 当前状态
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// 当前计数, 字节数与块数来自读取器
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            frames: self.frames,
            units: self.units,
            bytes: self.reader.bytes_read(),
            chunks: self.reader.chunks_read(),
        }
    }

    /// 运行到输入结束, 返回最终计数
    ///
    /// 已完成的驱动再次调用直接返回之前的计数.
    pub fn run(&mut self) -> Result<PipelineStats, PipelineError> {
        if self.state == DriverState::Done {
            return Ok(self.stats());
        }

        loop {
            self.state = DriverState::Reading;
            let len = self
                .reader
                .read_chunk(self.buffer.chunk_mut())
                .map_err(|source| PipelineError::Io { source })?;
            if len == 0 {
                break;
            }
            self.parse_chunk(len)?;
        }

        if self.options.flush_at_eof {
            self.state = DriverState::Flushing;
            self.decoder
                .flush()
                .map_err(|source| PipelineError::DecodeSubmit { source })?;
            self.drain()?;
        }

        self.state = DriverState::Done;
        let stats = self.stats();
        log::debug!(
            "流水线结束: frames={}, units={}, bytes={}, chunks={}",
            stats.frames,
            stats.units,
            stats.bytes,
            stats.chunks
        );
        Ok(stats)
    }

    /// 让解析器消耗完本块的 `len` 字节, 每产出一个单元就送入解码器
    fn parse_chunk(&mut self, len: usize) -> Result<(), PipelineError> {
        let chunk_start = self.reader.bytes_read() - len as u64;
        let mut offset = 0;
        while offset < len {
            self.state = DriverState::Parsing;
            let remaining = &self.buffer.valid(len)[offset..];
            let stream_offset = chunk_start + offset as u64;
            let (consumed, unit) =
                self.parser
                    .parse(remaining)
                    .map_err(|source| PipelineError::Parse {
                        offset: stream_offset,
                        source,
                    })?;

            if consumed > remaining.len() {
                return Err(PipelineError::Parse {
                    offset: stream_offset,
                    source: MediaError::Internal(format!(
                        "解析器消耗 {consumed} 字节, 超出剩余的 {} 字节",
                        remaining.len()
                    )),
                });
            }

            let Some(unit) = unit else {
                if consumed == 0 {
                    return Err(PipelineError::Parse {
                        offset: stream_offset,
                        source: MediaError::Internal("解析器未消耗数据也未产出单元".into()),
                    });
                }
                offset += consumed;
                continue;
            };

            let packet = Packet::copy_from_slice(unit);
            offset += consumed;

            self.state = DriverState::Decoding;
            self.units += 1;
            self.decoder
                .send_packet(&packet)
                .map_err(|source| PipelineError::DecodeSubmit { source })?;
            self.drain()?;
        }
        Ok(())
    }

    /// 取空解码器当前可用的所有帧
    fn drain(&mut self) -> Result<(), PipelineError> {
        loop {
            match self.decoder.receive_frame() {
                Ok(frame) => {
                    self.frames += 1;
                    log::trace!(
                        "取出第 {} 帧: {}, pts={}",
                        self.frames,
                        frame.media_type(),
                        frame.pts()
                    );
                }
                Err(MediaError::NeedMoreData | MediaError::Eof) => return Ok(()),
                Err(source) => return Err(PipelineError::DecodeDrain { source }),
            }
        }
    }
}

impl<R> Drop for PipelineDriver<R> {
    fn drop(&mut self) {
        log::trace!(
            "释放流水线资源: state={:?}, frames={}",
            self.state,
            self.frames
        );
    }
}

fn open_decoder(
    decoder: &mut dyn Decoder,
    options: &PipelineOptions,
) -> Result<(), PipelineError> {
    let params = CodecParameters::new(decoder.codec_id()).with_thread_count(options.thread_count);
    decoder
        .open(&params)
        .map_err(|source| PipelineError::CodecOpen { source })
}
