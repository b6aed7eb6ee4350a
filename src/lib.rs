//! # Auto Assess
//!
//! 西南交大教务处自动评教
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有唯一的 HTTP 会话（Cookie + 请求头），只暴露能力
//! - `HttpSession` - 请求、超时、可取消的等待
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `Authenticator` - 验证码登录重试
//! - `warmup` - 登录后建立会话
//! - `Lister` - 获取待评价列表
//! - `PayloadBuilder` - 解析问卷并构建答案
//! - `SubmissionScheduler` - 随机等待后提交
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个问卷"的完整处理流程
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 登录 → 建立会话 → 列表 → 逐个问卷
//!
//! 验证码识别是外部协作者，通过 `captcha::CaptchaSolver` 接入。

pub mod captcha;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use captcha::{CaptchaSolver, ConfiguredSolver};
pub use config::{Config, RunPolicy};
pub use error::{AppError, AppResult, ErrorKind};
pub use infrastructure::HttpSession;
pub use models::{Credentials, Password, PendingItem, QuestionnairePayload, RunReport, SubmissionResult};
pub use orchestrator::App;
pub use workflow::{ItemCtx, ItemFlow};
