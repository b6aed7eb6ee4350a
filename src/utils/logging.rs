//! 日志工具模块
//!
//! 提供日志初始化和格式化输出的辅助函数

use crate::config::RunPolicy;
use crate::models::RunReport;
use crate::workflow::ItemCtx;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `base_url`: 教务系统地址
/// - `solver_name`: 验证码识别方式
pub fn log_startup(base_url: &str, solver_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 西南交大教务处自动评教");
    info!("🌐 教务系统: {}", base_url);
    info!("🔤 验证码识别: {}", solver_name);
    info!("{}", "=".repeat(60));
}

/// 记录待评价问卷信息
pub fn log_items_loaded(total: usize, policy: RunPolicy) {
    let policy = match policy {
        RunPolicy::FailFast => "任一失败立即终止",
        RunPolicy::BestEffort => "失败后继续下一门",
    };
    info!("\n--- 开始自动评教 ---");
    info!("📋 共 {} 门课程待评价，失败策略: {}", total, policy);
}

/// 记录单个问卷开始处理
pub fn log_item_start(ctx: &ItemCtx) {
    info!("\n{}", "─".repeat(60));
    info!("{} 正在处理课程: {}", ctx.progress(), ctx.url);
}

/// 打印最终统计信息
pub fn print_final_stats(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.succeeded(), report.total);
    info!("❌ 失败: {}", report.failed());
    for outcome in report.outcomes.iter().filter(|o| !o.result.success) {
        info!("   - {}: {}", outcome.url, outcome.result.message);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
