//! 基础设施层
//!
//! 持有唯一的 HTTP 会话（Cookie + 默认请求头），只暴露"发请求"和"等待"的能力。

pub mod endpoints;
pub mod http_session;
pub mod pacing;

pub use endpoints::Endpoints;
pub use http_session::HttpSession;
