//! decbench - 解码吞吐量基准测试工具
//!
//! 分块读取原始码流文件, 切分为编码单元后送入指定解码器,
//! 输出解码帧数, 耗时与每秒帧数.

mod logging;

use std::error::Error as _;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use decbench::codec::CodecRegistry;
use decbench::{BenchReport, Benchmark, DEFAULT_CHUNK_SIZE, PipelineError, PipelineOptions};

/// 解码吞吐量基准测试工具
#[derive(Parser, Debug)]
#[command(name = "decbench", version, about = "测量解码器对原始码流的解码吞吐量")]
struct Cli {
    /// 输入码流文件 (如 .h264 / .mp3)
    input: Option<PathBuf>,

    /// 解码器名称 (见 --list-codecs)
    codec: Option<String>,

    /// 解码线程数提示 (0 表示由解码器决定), 使用 --sweep 时可省略
    num_threads: Option<usize>,

    /// 每次读取的块大小 (字节)
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_positive)]
    chunk_size: usize,

    /// 依次以 1..=N 个线程运行, 每个线程数输出一行结果
    #[arg(long, value_name = "MAX_THREADS", value_parser = parse_positive)]
    sweep: Option<usize>,

    /// 每个配置重复运行的次数, 输出耗时最短的一次
    #[arg(long, default_value_t = 1, value_parser = parse_positive)]
    runs: usize,

    /// 以 JSON 格式输出结果
    #[arg(long)]
    json: bool,

    /// 列出已注册的解码器与解析器
    #[arg(long)]
    list_codecs: bool,

    /// 日志详细程度 (-v/-vv/-vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 额外写入按天滚动的日志文件的目录
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|e| format!("无效的数值 '{s}': {e}"))?;
    if value == 0 {
        return Err("必须大于 0".into());
    }
    Ok(value)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    let registry = decbench::default_codec_registry();

    if cli.list_codecs {
        print_codecs(&registry);
        return;
    }

    let (Some(input), Some(codec)) = (cli.input.as_ref(), cli.codec.as_deref()) else {
        exit_usage();
    };
    let num_threads = match (cli.num_threads, cli.sweep) {
        (Some(n), _) => n,
        (None, Some(_)) => 0,
        (None, None) => exit_usage(),
    };

    tracing::info!(
        "decbench {}: input={}, codec={codec}, threads={num_threads}, chunk_size={}, runs={}",
        decbench::version(),
        input.display(),
        cli.chunk_size,
        cli.runs
    );

    let options = PipelineOptions::new(num_threads).with_chunk_size(cli.chunk_size);
    let bench = Benchmark::new(codec, options);
    let rendered = match cli.sweep {
        Some(max_threads) => bench
            .sweep(&registry, input, max_threads, cli.runs)
            .map(|reports| render_sweep(&reports, cli.json)),
        None => bench
            .run_best_of(&registry, input, cli.runs)
            .map(|report| render_single(&report, cli.json)),
    };
    match rendered {
        Ok(Ok(text)) => println!("{text}"),
        Ok(Err(e)) => {
            eprintln!("错误: JSON 序列化失败: {e}");
            process::exit(1);
        }
        Err(err) => {
            report_error(&err);
            process::exit(err.exit_code());
        }
    }
}

fn render_single(report: &BenchReport, json: bool) -> serde_json::Result<String> {
    if json {
        serde_json::to_string_pretty(report)
    } else {
        Ok(report.to_string())
    }
}

/// 扫描结果: 每个线程数一行, JSON 模式输出数组
fn render_sweep(reports: &[BenchReport], json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string_pretty(reports);
    }
    let lines: Vec<String> = reports
        .iter()
        .map(|report| format!("Threads: {}, {report}", report.threads))
        .collect();
    Ok(lines.join("\n"))
}

fn exit_usage() -> ! {
    let usage = PipelineError::Usage {
        program: program_name(),
    };
    eprintln!("{usage}");
    process::exit(usage.exit_code());
}

/// 输出诊断信息, 底层原因写入日志
fn report_error(err: &PipelineError) {
    eprintln!("{err}");
    let mut source = err.source();
    while let Some(cause) = source {
        tracing::debug!("原因: {cause}");
        source = cause.source();
    }
}

fn program_name() -> String {
    std::env::args()
        .next()
        .unwrap_or_else(|| "decbench".to_string())
}

fn print_codecs(registry: &CodecRegistry) {
    println!("解码器:");
    for (id, name) in registry.list_decoders() {
        println!("  {name:<12} {id} ({})", id.media_type());
    }
    println!();
    println!("解析器:");
    for (id, name) in registry.list_parsers() {
        println!("  {name:<12} {id}");
    }
}
