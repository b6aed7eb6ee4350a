//! 问卷处理流程 - 流程层
//!
//! 定义"一个问卷"的完整处理流程：进入问卷页面 → 解析并构建答案 → 等待后提交

use crate::config::Config;
use crate::error::{AppResult, SubmissionError};
use crate::infrastructure::HttpSession;
use crate::models::SubmissionResult;
use crate::services::payload_builder::client_timestamp;
use crate::services::{PayloadBuilder, SubmissionScheduler};
use crate::workflow::item_ctx::ItemCtx;
use tracing::{info, warn};

/// 问卷处理流程
///
/// - 不持有任何资源（会话由编排层传入）
/// - 只依赖业务能力（services）
pub struct ItemFlow {
    builder: PayloadBuilder,
    scheduler: SubmissionScheduler,
}

impl ItemFlow {
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self::with_parts(
            PayloadBuilder::new(config)?,
            SubmissionScheduler::new(config),
        ))
    }

    pub fn with_parts(builder: PayloadBuilder, scheduler: SubmissionScheduler) -> Self {
        Self { builder, scheduler }
    }

    pub async fn run(&self, session: &HttpSession, ctx: &ItemCtx) -> AppResult<SubmissionResult> {
        info!(" -> 正在进入问卷页面...");
        let document = session.get_text(&ctx.url, None).await.map_err(|e| {
            e.map_http(|source| {
                SubmissionError::Fetch {
                    url: ctx.url.clone(),
                    source,
                }
                .into()
            })
        })?;

        info!(" -> 正在解析问卷并构建答案...");
        let payload = self.builder.build(&document, &client_timestamp());
        info!(" -> 共 {} 道题目待提交", payload.records.len());
        if !payload.warnings.is_empty() {
            warn!(" -> ⚠️ {} 道题目因无法作答被跳过", payload.warnings.len());
        }

        self.scheduler.submit(session, ctx, &payload).await
    }
}
