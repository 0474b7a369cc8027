use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use pricelist_fetch::utils::logging;
use pricelist_fetch::{extract_document, App, Config, PriceLineFilter};

/// 供应商价目表获取工具
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 下载注册表中所有供应商的价目表（默认）
    Acquire {
        /// 只处理这些供应商，可重复
        #[arg(long = "only")]
        only: Vec<String>,
    },

    /// 对 PDF 的某一页做 OCR
    Extract {
        /// PDF 文件路径
        document: PathBuf,

        /// 页码，从 0 开始
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// 逗号分隔的型号列表，只输出包含这些型号的行
        #[arg(long, value_delimiter = ',')]
        models: Vec<String>,

        /// 使用内置的显卡型号列表筛选
        #[arg(long, conflicts_with = "models")]
        default_models: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = logging::init(config.verbose_logging, &config.output_log_file) {
        eprintln!("日志初始化失败: {:#}", e);
        return ExitCode::from(1);
    }

    let command = cli.command.unwrap_or(Command::Acquire { only: Vec::new() });
    match run(command, config).await {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(command: Command, config: Config) -> Result<ExitCode> {
    match command {
        Command::Acquire { only } => {
            let app = App::initialize(config, &only).await?;

            tokio::select! {
                summary = app.run() => {
                    let summary = summary?;
                    if summary.had_startup_failure() {
                        warn!("浏览器无法启动，交互式供应商未处理");
                        return Ok(ExitCode::from(2));
                    }
                    Ok(ExitCode::SUCCESS)
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("⚠️ 收到 Ctrl-C，停止处理");
                    Ok(ExitCode::from(130))
                }
            }
        }
        Command::Extract {
            document,
            page,
            models,
            default_models,
        } => {
            let filter = if default_models {
                Some(PriceLineFilter::default_models())
            } else if !models.is_empty() {
                Some(PriceLineFilter::new(models))
            } else {
                None
            };

            let text = extract_document(&config, &document, page, filter.as_ref()).await?;
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
    }
}
