//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 持有唯一的 HTTP 会话和验证码识别器，按顺序调度整个流程：
//!
//! ```text
//! 登录 (Authenticator)
//!     ↓
//! 建立会话 (warmup)
//!     ↓
//! 获取待评价列表 (Lister)
//!     ↓
//! 逐个问卷: workflow::ItemFlow (进入 → 解析 → 等待 → 提交)
//! ```
//!
//! 没有并发：服务器对每个问卷都有最短等待要求，并发提交会被当作刷接口。

pub mod pipeline;

pub use pipeline::App;
