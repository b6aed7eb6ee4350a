//! 评教流程编排 - 编排层
//!
//! ## 核心功能
//!
//! 1. **资源管理**：创建并独占 `HttpSession`，以引用传给各个服务
//! 2. **流程调度**：登录 → 建立会话 → 获取列表 → 逐个问卷处理
//! 3. **失败策略**：按 [`RunPolicy`] 决定单个问卷失败时终止还是继续
//! 4. **全局统计**：汇总所有问卷的提交结果

use crate::captcha::CaptchaSolver;
use crate::config::{Config, RunPolicy};
use crate::error::AppResult;
use crate::infrastructure::HttpSession;
use crate::models::{Credentials, PendingItem, RunReport, SubmissionResult};
use crate::services::{warmup, Authenticator, Lister};
use crate::utils::logging;
use crate::workflow::{ItemCtx, ItemFlow};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 应用主结构
pub struct App<S> {
    config: Config,
    session: HttpSession,
    solver: S,
    authenticator: Authenticator,
    lister: Lister,
    flow: ItemFlow,
}

impl<S: CaptchaSolver> App<S> {
    /// 初始化应用
    pub fn new(config: Config, solver: S) -> AppResult<Self> {
        Self::with_cancel(config, solver, CancellationToken::new())
    }

    /// 使用外部取消令牌初始化应用
    pub fn with_cancel(config: Config, solver: S, cancel: CancellationToken) -> AppResult<Self> {
        let session = HttpSession::new(&config, cancel)?;
        Ok(Self {
            authenticator: Authenticator::new(&config),
            lister: Lister::new()?,
            flow: ItemFlow::new(&config)?,
            config,
            session,
            solver,
        })
    }

    /// 取消令牌，触发后流程在下一次请求或下一秒等待时结束
    pub fn cancel_token(&self) -> CancellationToken {
        self.session.cancel_token().clone()
    }

    pub fn session(&self) -> &HttpSession {
        &self.session
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// 运行完整流程
    pub async fn run(&self, credentials: &Credentials) -> AppResult<RunReport> {
        self.authenticator
            .authenticate(&self.session, &self.solver, credentials)
            .await?;
        warmup(&self.session).await?;

        let items = self.lister.list_pending(&self.session).await?;
        if items.is_empty() {
            info!("没有需要评价的课程");
            return Ok(RunReport::new(0));
        }

        let report = self.process_items(&items).await?;
        logging::print_final_stats(&report);
        Ok(report)
    }

    /// 逐个处理问卷
    async fn process_items(&self, items: &[PendingItem]) -> AppResult<RunReport> {
        let total = items.len();
        let mut report = RunReport::new(total);
        logging::log_items_loaded(total, self.config.run_policy);

        for (idx, item) in items.iter().enumerate() {
            let ctx = ItemCtx::new(idx + 1, total, item.url());
            logging::log_item_start(&ctx);

            match self.flow.run(&self.session, &ctx).await {
                Ok(result) => report.record(item.url(), result),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => match self.config.run_policy {
                    RunPolicy::FailFast => {
                        error!("{} ❌ {}", ctx.progress(), e);
                        return Err(e);
                    }
                    RunPolicy::BestEffort => {
                        error!("{} ❌ {}，继续处理下一门课程", ctx.progress(), e);
                        report.record(item.url(), SubmissionResult::failed(e.to_string()));
                    }
                },
            }

            if !ctx.is_last() {
                info!("...暂停 {} 毫秒，防止请求过快...", self.config.item_pause_ms);
                self.session.pause(self.config.item_pause()).await?;
            }
        }

        Ok(report)
    }
}
