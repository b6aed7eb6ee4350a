//! 会话建立 - 业务能力层
//!
//! 登录接口返回成功后，服务器端的会话还没有完全建立，必须再访问一次加载页面，
//! 否则后续接口仍然认为未登录。

use crate::error::{AppError, AppResult};
use crate::infrastructure::HttpSession;
use tracing::info;

/// 访问加载页面，失败不重试
pub async fn warmup(session: &HttpSession) -> AppResult<()> {
    info!("正在访问加载页面以建立完整会话...");
    let endpoints = session.endpoints();
    let login_page = endpoints.login_page();
    session
        .get_text(&endpoints.loading(), Some(&login_page))
        .await
        .map_err(|e| e.map_http(AppError::SessionWarmup))?;
    info!("会话建立步骤完成。");
    Ok(())
}
