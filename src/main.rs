use anyhow::{bail, Result};
use auto_assess::utils::logging;
use auto_assess::{App, Config, ConfiguredSolver};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);
    if let Some(path) = Config::file_path() {
        info!("📄 读取配置文件: {}", path.display());
    }
    config.validate()?;

    let credentials = config.credentials()?;
    let solver = ConfiguredSolver::from_config(&config)?;
    logging::log_startup(&config.base_url, solver.name());

    let app = App::new(config, solver)?;

    // Ctrl-C 取消当前等待或请求
    let cancel = app.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，正在停止...");
            cancel.cancel();
        }
    });

    let report = app.run(&credentials).await?;
    if !report.is_success() {
        bail!("{} 门课程评价失败", report.failed());
    }

    info!("--- 所有课程评价完成！ ---");
    Ok(())
}
