//! 解码器 trait 定义.
//!
//! 所有解码引擎 (symphonia, openh264, libavcodec 等) 都实现 `Decoder` trait.

use decbench_core::MediaResult;

use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::frame::Frame;
use crate::packet::Packet;

/// 解码器 trait
///
/// 解码流程:
/// 1. 调用 `open()` 配置解码器 (含并行度提示)
/// 2. 调用 `send_packet()` 送入一个编码单元
/// 3. 反复调用 `receive_frame()` 取出解码后的帧, 直到返回 `NeedMoreData` 或 `Eof`
/// 4. 输入结束后送入空包 (flush), 再次取空所有缓存帧
///
/// 解码器可以在内部使用多线程, 但对调用方而言所有调用都是同步且顺序的.
/// 输出帧的顺序不必与输入单元一致, 数量也不必一一对应.
pub trait Decoder: Send {
    /// 获取解码器标识
    fn codec_id(&self) -> CodecId;

    /// 获取解码器名称
    fn name(&self) -> &str;

    /// 使用参数配置并打开解码器
    fn open(&mut self, params: &CodecParameters) -> MediaResult<()>;

    /// 送入一个压缩数据包进行解码
    ///
    /// # 参数
    /// - `packet`: 压缩数据包. 送入空包表示刷新 (flush), 之后不再接受数据.
    ///
    /// # 返回
    /// - `Ok(())`: 数据包已接受
    /// - `Err(_)`: 解码器拒绝该输入 (未打开, 状态非法等)
    fn send_packet(&mut self, packet: &Packet) -> MediaResult<()>;

    /// 从解码器取出一帧解码数据
    ///
    /// # 返回
    /// - `Ok(frame)`: 成功取出一帧
    /// - `Err(MediaError::NeedMoreData)`: 当前没有可用输出, 需要送入更多数据包
    /// - `Err(MediaError::Eof)`: 刷新后所有帧已取出
    fn receive_frame(&mut self) -> MediaResult<Frame>;

    /// 刷新解码器: 送入空包, 请求释放内部缓存的帧
    fn flush(&mut self) -> MediaResult<()> {
        self.send_packet(&Packet::empty())
    }
}
