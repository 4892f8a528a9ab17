//! MPEG 音频解码器 (mp1/mp2/mp3), 基于 symphonia.
//!
//! 每个送入的数据包必须是一个完整的 MPEG 音频帧 (由 `MpegAudioParser` 切分).
//! 解码器无帧重排, 每个包最多产出一帧; 刷新后直接进入 EOF.

use decbench_core::{MediaError, MediaResult};
use symphonia_bundle_mp3::MpaDecoder as SymMpaDecoder;
use symphonia_core::codecs::{
    CODEC_TYPE_MP1, CODEC_TYPE_MP2, CODEC_TYPE_MP3, CodecParameters as SymCodecParameters,
    CodecType as SymCodecType, Decoder as SymDecoderTrait, DecoderOptions as SymDecoderOptions,
};
use symphonia_core::errors::Error as SymError;
use symphonia_core::formats::Packet as SymPacket;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::decoder::Decoder;
use crate::frame::{AudioFrame, Frame};
use crate::packet::Packet;

/// MPEG 音频解码器
pub struct MpegAudioDecoder {
    codec_id: CodecId,
    /// symphonia 解码器, `open()` 之后可用
    inner: Option<SymMpaDecoder>,
    /// 待取出的帧
    output_frame: Option<Frame>,
    /// 是否已收到刷新包
    flushing: bool,
    /// 下一帧的 PTS (以采样为单位)
    next_pts: i64,
    /// 已解码帧数
    decoded: u64,
}

impl MpegAudioDecoder {
    fn new(codec_id: CodecId) -> Self {
        Self {
            codec_id,
            inner: None,
            output_frame: None,
            flushing: false,
            next_pts: 0,
            decoded: 0,
        }
    }

    pub fn create_mp1() -> MediaResult<Box<dyn Decoder>> {
        Ok(Box::new(Self::new(CodecId::Mp1)))
    }

    pub fn create_mp2() -> MediaResult<Box<dyn Decoder>> {
        Ok(Box::new(Self::new(CodecId::Mp2)))
    }

    pub fn create_mp3() -> MediaResult<Box<dyn Decoder>> {
        Ok(Box::new(Self::new(CodecId::Mp3)))
    }

    fn symphonia_codec(&self) -> MediaResult<SymCodecType> {
        match self.codec_id {
            CodecId::Mp1 => Ok(CODEC_TYPE_MP1),
            CodecId::Mp2 => Ok(CODEC_TYPE_MP2),
            CodecId::Mp3 => Ok(CODEC_TYPE_MP3),
            other => Err(MediaError::Unsupported(format!(
                "symphonia MPEG 音频解码器不支持 {other}"
            ))),
        }
    }
}

impl Decoder for MpegAudioDecoder {
    fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    fn name(&self) -> &str {
        self.codec_id.name()
    }

    fn open(&mut self, params: &CodecParameters) -> MediaResult<()> {
        if params.thread_count > 1 {
            log::debug!(
                "{}: 单线程解码器, 忽略并行度提示 thread_count={}",
                self.codec_id,
                params.thread_count
            );
        }
        let sym_params = SymCodecParameters {
            codec: self.symphonia_codec()?,
            ..Default::default()
        };
        self.inner = Some(
            SymMpaDecoder::try_new(&sym_params, &SymDecoderOptions::default()).map_err(|e| {
                MediaError::Codec(format!("symphonia {} 初始化失败: {e}", self.codec_id))
            })?,
        );
        self.output_frame = None;
        self.flushing = false;
        self.next_pts = 0;
        self.decoded = 0;
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> MediaResult<()> {
        let Some(decoder) = self.inner.as_mut() else {
            return Err(MediaError::Codec(format!("{} 解码器未打开", self.codec_id)));
        };
        if self.flushing {
            return Err(MediaError::Codec(format!(
                "{} 解码器已刷新, 不再接受数据",
                self.codec_id
            )));
        }
        if packet.is_empty() {
            self.flushing = true;
            log::debug!("{}: 刷新, 共解码 {} 帧", self.codec_id, self.decoded);
            return Ok(());
        }
        if self.output_frame.is_some() {
            return Err(MediaError::Codec(format!(
                "{} 解码器输出未取出",
                self.codec_id
            )));
        }

        let sym_pkt = SymPacket::new_from_slice(0, self.next_pts.max(0) as u64, 0, &packet.data);
        match decoder.decode(&sym_pkt) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let nb_samples = decoded.frames() as u32;
                let mut frame =
                    AudioFrame::new(nb_samples, spec.rate, spec.channels.count() as u32);
                frame.pts = self.next_pts;
                self.next_pts += i64::from(nb_samples);
                self.decoded += 1;
                self.output_frame = Some(Frame::Audio(frame));
                Ok(())
            }
            Err(SymError::DecodeError(reason)) => Err(MediaError::InvalidData(format!(
                "{} 第 {} 帧数据损坏: {reason}",
                self.codec_id, self.decoded
            ))),
            Err(e) => Err(MediaError::Codec(format!(
                "symphonia {} 解码失败: {e}",
                self.codec_id
            ))),
        }
    }

    fn receive_frame(&mut self) -> MediaResult<Frame> {
        if let Some(frame) = self.output_frame.take() {
            return Ok(frame);
        }
        if self.flushing {
            Err(MediaError::Eof)
        } else {
            Err(MediaError::NeedMoreData)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// MPEG-1 Layer III, 128 kbps, 44100 Hz, 立体声, 负载全零 (静音)
    fn silent_mp3_frame() -> Vec<u8> {
        let mut frame = vec![0u8; 417];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x04]);
        frame
    }

    #[test]
    fn test_rejects_data_before_open() {
        let mut dec = MpegAudioDecoder::new(CodecId::Mp3);
        let pkt = Packet::copy_from_slice(&silent_mp3_frame());
        assert!(dec.send_packet(&pkt).is_err());
    }

    #[test]
    fn test_decode_silent_frames() {
        let mut dec = MpegAudioDecoder::new(CodecId::Mp3);
        dec.open(&CodecParameters::new(CodecId::Mp3).with_thread_count(4))
            .unwrap();
        assert!(matches!(dec.receive_frame(), Err(MediaError::NeedMoreData)));

        let mut frames = 0;
        for _ in 0..3 {
            dec.send_packet(&Packet::copy_from_slice(&silent_mp3_frame()))
                .unwrap();
            while let Ok(frame) = dec.receive_frame() {
                match frame {
                    Frame::Audio(a) => {
                        assert_eq!(a.nb_samples, 1152);
                        assert_eq!(a.sample_rate, 44100);
                        assert_eq!(a.channels, 2);
                    }
                    Frame::Video(_) => panic!("不应产出视频帧"),
                }
                frames += 1;
            }
        }
        assert_eq!(frames, 3);

        dec.flush().unwrap();
        assert!(matches!(dec.receive_frame(), Err(MediaError::Eof)));
        // 刷新后不再接受数据
        assert!(
            dec.send_packet(&Packet::copy_from_slice(&silent_mp3_frame()))
                .is_err()
        );
    }

    #[test]
    fn test_corrupt_frame_is_rejected() {
        let mut dec = MpegAudioDecoder::new(CodecId::Mp3);
        dec.open(&CodecParameters::new(CodecId::Mp3)).unwrap();

        let mut corrupt = vec![0xFFu8; 417];
        corrupt[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x04]);
        let err = dec
            .send_packet(&Packet::copy_from_slice(&corrupt))
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidData(_)), "{err}");
        assert!(matches!(dec.receive_frame(), Err(MediaError::NeedMoreData)));
    }

    #[test]
    fn test_重新打开重置状态() {
        let mut dec = MpegAudioDecoder::new(CodecId::Mp2);
        dec.open(&CodecParameters::new(CodecId::Mp2)).unwrap();
        dec.flush().unwrap();
        dec.open(&CodecParameters::new(CodecId::Mp2)).unwrap();
        assert!(matches!(dec.receive_frame(), Err(MediaError::NeedMoreData)));
    }
}
