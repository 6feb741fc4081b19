use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use batch_extract::Application;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use extract_core::config::{AppConfig, ConfigValidator, Language, LogFormat};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 解析命令行参数
    let matches = Command::new("batch-extract")
        .version("1.0.0")
        .about("批量文件文本提取客户端")
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .help("要提取文本的文件")
                .num_args(1..)
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径"),
        )
        .arg(
            Arg::new("concurrency")
                .short('n')
                .long("concurrency")
                .value_name("N")
                .help("同时在途的最大请求数")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("提取服务地址"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("把提取结果写入该目录下的 .txt 文件"),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .help("在控制台打印完整的提取文本")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .value_name("LANG")
                .help("界面语言")
                .value_parser(["en", "zh"]),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty", "compact"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = AppConfig::load(config_path).with_context(|| match config_path {
        Some(path) => format!("加载配置文件失败: {path}"),
        None => "加载配置失败".to_string(),
    })?;
    apply_overrides(&mut config, &matches)?;

    // 初始化日志系统
    init_logging(&config.observability.log_level, config.observability.log_format)?;

    let paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    info!("启动批量提取: 文件数={}", paths.len());
    info!("并发数: {}", config.scheduler.max_concurrency);

    let language = config.output.language;
    let app = Application::new(config)?;
    let report = app.run(&paths).await?;

    println!("{}", report.render(language));

    if report.tasks.is_empty() {
        error!("没有任何输入文件被成功加载");
        return Ok(ExitCode::FAILURE);
    }
    if report.has_transport_failures() {
        error!("{} 个文件提取失败", report.summary.failed);
        return Ok(ExitCode::FAILURE);
    }

    info!("批量提取完成");
    Ok(ExitCode::SUCCESS)
}

/// 命令行参数覆盖配置
fn apply_overrides(config: &mut AppConfig, matches: &ArgMatches) -> Result<()> {
    if let Some(n) = matches.get_one::<usize>("concurrency") {
        config.scheduler.max_concurrency = *n;
    }
    if let Some(url) = matches.get_one::<String>("base-url") {
        config.client.base_url = url.clone();
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.output.output_dir = Some(dir.clone());
    }
    if matches.get_flag("stdout") {
        config.output.print_content = true;
    }
    if let Some(lang) = matches.get_one::<String>("lang") {
        config.output.language = lang.parse::<Language>()?;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.observability.log_level = level.clone();
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.observability.log_format = format.parse::<LogFormat>()?;
    }

    config.validate().context("命令行参数无效")?;
    Ok(())
}

/// 初始化日志系统，日志输出到标准错误以免与提取结果混在一起
fn init_logging(log_level: &str, log_format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        LogFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        LogFormat::Compact => {
            registry
                .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
                .context("初始化Compact日志格式失败")?;
        }
    }

    Ok(())
}
