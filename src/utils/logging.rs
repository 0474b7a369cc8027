//! 日志工具模块
//!
//! 同时输出到终端和运行日志文件，并提供启动、统计等格式化输出。

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::orchestrator::RunSummary;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时为 `info`，详细模式为 `debug`。
pub fn init(verbose: bool, log_file_path: &str) -> Result<()> {
    init_log_file(log_file_path)?;

    let file = OpenOptions::new()
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件 {}", log_file_path))?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("日志系统已初始化")?;

    Ok(())
}

/// 初始化日志文件（覆盖旧内容并写入表头）
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n价目表获取日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件 {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 供应商价目表获取");
    info!("📂 输出目录: {}", config.output_dir.display());
    info!(
        "⏱️ 元素超时: {:?} / 下载超时: {:?}",
        config.locator_timeout, config.download_timeout
    );
    info!("{}", "=".repeat(60));
}

/// 记录注册表加载信息
pub fn log_vendors_loaded(total: usize, output_dir: &Path) {
    info!("✓ 共 {} 个待处理的供应商", total);
    info!("💡 逐个处理，文档保存到 {}\n", output_dir.display());
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "✅ 成功: {}/{}",
        summary.succeeded().count(),
        summary.total()
    );
    for result in summary.succeeded() {
        if let Some(path) = &result.file_path {
            info!("   {} → {}", result.vendor_id, path.display());
        }
    }
    info!("❌ 失败: {}", summary.failed().count());
    for result in summary.failed() {
        error!(
            "   {} [{}] {}",
            result.vendor_id,
            result
                .error_kind
                .map(|k| k.to_string())
                .unwrap_or_default(),
            result.error_detail.as_deref().unwrap_or("")
        );
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
