//! 计时与吞吐量报告.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use decbench_codec::CodecRegistry;
use serde::Serialize;

use crate::driver::{PipelineDriver, PipelineOptions, PipelineStats};
use crate::error::PipelineError;

/// 一次基准测试的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    /// 解码器名称
    pub codec: String,
    /// 并行度提示
    pub threads: usize,
    /// 块大小 (字节)
    pub chunk_size: usize,
    /// 解码帧数
    pub frames: u64,
    /// 送入的编码单元数
    pub units: u64,
    /// 输入字节数
    pub bytes: u64,
    /// 耗时 (毫秒)
    pub elapsed_ms: u64,
    /// 耗时 (秒)
    pub elapsed_secs: f64,
    /// 每秒帧数, 耗时为 0 时不可用
    pub fps: Option<f64>,
    /// 运行次数, 报告取其中耗时最短的一次
    pub runs: usize,
}

impl BenchReport {
    /// 由计数与耗时生成报告, 耗时按毫秒截断
    pub fn new(
        codec: impl Into<String>,
        options: &PipelineOptions,
        stats: PipelineStats,
        elapsed: Duration,
    ) -> Self {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let elapsed_secs = elapsed_ms as f64 / 1000.0;
        let fps = (elapsed_ms > 0).then(|| stats.frames as f64 / elapsed_secs);
        Self {
            codec: codec.into(),
            threads: options.thread_count,
            chunk_size: options.chunk_size,
            frames: stats.frames,
            units: stats.units,
            bytes: stats.bytes,
            elapsed_ms,
            elapsed_secs,
            fps,
            runs: 1,
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame number: {}, Time elapsed: {:.3}s, FPS: ",
            self.frames, self.elapsed_secs
        )?;
        match self.fps {
            Some(fps) => write!(f, "{fps:.2}"),
            None => write!(f, "N/A"),
        }
    }
}

/// 解码吞吐量基准测试
///
/// 计时从初始化之前开始, 到所有资源释放之后结束.
#[derive(Debug, Clone)]
pub struct Benchmark {
    codec_name: String,
    options: PipelineOptions,
}

impl Benchmark {
    pub fn new(codec_name: impl Into<String>, options: PipelineOptions) -> Self {
        Self {
            codec_name: codec_name.into(),
            options,
        }
    }

    /// 解码器名称
    pub fn codec_name(&self) -> &str {
        &self.codec_name
    }

    /// 流水线配置
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// 对输入文件运行一次完整的流水线
    pub fn run(
        &self,
        registry: &CodecRegistry,
        path: impl AsRef<Path>,
    ) -> Result<BenchReport, PipelineError> {
        let path = path.as_ref();
        self.measure(|| {
            let mut driver =
                PipelineDriver::open(registry, &self.codec_name, path, self.options.clone())?;
            driver.run()
        })
    }

    /// 重复运行 `runs` 次 (至少一次), 返回耗时最短的一次
    pub fn run_best_of(
        &self,
        registry: &CodecRegistry,
        path: impl AsRef<Path>,
        runs: usize,
    ) -> Result<BenchReport, PipelineError> {
        let path = path.as_ref();
        let runs = runs.max(1);
        let mut best = self.run(registry, path)?;
        for run in 2..=runs {
            let report = self.run(registry, path)?;
            log::debug!("{} 第 {run}/{runs} 次: {report}", self.codec_name);
            if report.frames != best.frames {
                log::warn!(
                    "{}: 重复运行帧数不一致, {} != {}",
                    self.codec_name,
                    report.frames,
                    best.frames
                );
            }
            if report.elapsed_ms < best.elapsed_ms {
                best = report;
            }
        }
        best.runs = runs;
        Ok(best)
    }

    /// 并行度扫描: 线程数依次取 `1..=max_threads`, 每个线程数运行 `runs` 次
    ///
    /// 任一次运行失败即返回错误.
    pub fn sweep(
        &self,
        registry: &CodecRegistry,
        path: impl AsRef<Path>,
        max_threads: usize,
        runs: usize,
    ) -> Result<Vec<BenchReport>, PipelineError> {
        let path = path.as_ref();
        (1..=max_threads.max(1))
            .map(|thread_count| {
                let options = PipelineOptions {
                    thread_count,
                    ..self.options.clone()
                };
                Self::new(self.codec_name.clone(), options).run_best_of(registry, path, runs)
            })
            .collect()
    }

    /// 计时执行 `pipeline`, 其内部创建的资源在计时结束前释放
    pub fn measure<F>(&self, pipeline: F) -> Result<BenchReport, PipelineError>
    where
        F: FnOnce() -> Result<PipelineStats, PipelineError>,
    {
        let start = Instant::now();
        let stats = pipeline()?;
        let elapsed = start.elapsed();
        log::info!(
            "{}: {} 帧, 耗时 {} ms",
            self.codec_name,
            stats.frames,
            elapsed.as_millis()
        );
        Ok(BenchReport::new(
            self.codec_name.clone(),
            &self.options,
            stats,
            elapsed,
        ))
    }
}
