//! 提交服务 - 业务能力层
//!
//! 教务处要求打开问卷后至少等待一分钟才能提交。每个问卷在窗口内随机抽取
//! 等待时间，倒计时结束后才发出提交请求。成功与否以响应正文中的标记为准，
//! 不看状态码。

use crate::config::Config;
use crate::error::{AppResult, SubmissionError};
use crate::infrastructure::HttpSession;
use crate::models::{QuestionnairePayload, SubmissionResult};
use crate::utils::logging::truncate_text;
use crate::workflow::ItemCtx;
use rand::Rng;
use tracing::{debug, info};

/// 提交成功时响应正文中的标记
pub const SUCCESS_MARKER: &str = "操作成功";

/// 提交前等待时间窗口（秒，闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayWindow {
    min_secs: u64,
    max_secs: u64,
}

impl DelayWindow {
    /// 上下限顺序颠倒时自动交换
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: min_secs.max(max_secs),
        }
    }

    pub fn min_secs(&self) -> u64 {
        self.min_secs
    }

    pub fn max_secs(&self) -> u64 {
        self.max_secs
    }

    /// 在窗口内均匀抽取等待秒数
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.random_range(self.min_secs..=self.max_secs)
    }
}

/// 提交服务
pub struct SubmissionScheduler {
    window: DelayWindow,
}

impl SubmissionScheduler {
    pub fn new(config: &Config) -> Self {
        Self::with_window(DelayWindow::new(
            config.submit_delay_min_secs,
            config.submit_delay_max_secs,
        ))
    }

    pub fn with_window(window: DelayWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> DelayWindow {
        self.window
    }

    /// 等待随机时长后提交问卷
    pub async fn submit(
        &self,
        session: &HttpSession,
        ctx: &ItemCtx,
        payload: &QuestionnairePayload,
    ) -> AppResult<SubmissionResult> {
        let delay = self.window.draw(&mut rand::rng());
        info!(
            " -> 教务处强制要求等待至少一分钟，本次在 [{}, {}] 秒内随机，将等待 {} 秒后提交... {}",
            self.window.min_secs, self.window.max_secs, delay, ctx.progress()
        );

        session
            .countdown(delay, |remaining| {
                if remaining > 0 && remaining % 10 == 0 {
                    info!(" -> 倒计时: {}秒 {}", remaining, ctx.progress());
                } else {
                    debug!(" -> 倒计时: {}秒 {}", remaining, ctx.progress());
                }
            })
            .await?;
        info!(" -> 倒计时结束，准备提交。 {}", ctx.progress());

        info!(" -> 正在提交评价...");
        let form = payload.to_form();
        let body = session
            .post_form_text(&session.endpoints().submit(), &form, Some(&ctx.url))
            .await
            .map_err(|e| {
                e.map_http(|source| {
                    SubmissionError::Request {
                        url: ctx.url.clone(),
                        source,
                    }
                    .into()
                })
            })?;

        let result = interpret_submission(&body, &ctx.url)?;
        info!(" -> ✅ 提交成功！");
        Ok(result)
    }
}

/// 根据响应正文判断是否提交成功
pub fn interpret_submission(body: &str, url: &str) -> Result<SubmissionResult, SubmissionError> {
    if body.contains(SUCCESS_MARKER) {
        Ok(SubmissionResult::succeeded(SUCCESS_MARKER))
    } else {
        Err(SubmissionError::Rejected {
            url: url.to_string(),
            snippet: truncate_text(body.trim(), 80),
        })
    }
}
