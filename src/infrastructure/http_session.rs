//! HTTP 会话 - 基础设施层
//!
//! 持有唯一的 `reqwest::Client`（开启 Cookie 存储），整个进程只创建一次，
//! 由编排层持有并以引用传给各个服务。

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, HttpError};
use crate::infrastructure::endpoints::Endpoints;
use crate::infrastructure::pacing;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// HTTP 会话
///
/// 职责：
/// - 持有 Cookie 和默认请求头
/// - 每次请求前检查取消令牌，并对每个请求设置超时
/// - 不认识问卷 / 登录等业务概念
pub struct HttpSession {
    client: reqwest::Client,
    endpoints: Endpoints,
    cancel: CancellationToken,
}

impl HttpSession {
    /// 根据配置创建会话
    pub fn new(config: &Config, cancel: CancellationToken) -> AppResult<Self> {
        let endpoints = Endpoints::new(&config.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| ConfigError::Invalid {
                key: "user_agent",
                reason: e.to_string(),
            })?,
        );
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(endpoints.base_url()).map_err(|e| ConfigError::Invalid {
                key: "base_url",
                reason: e.to_string(),
            })?,
        );

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(HttpError::Client)?;

        Ok(Self {
            client,
            endpoints,
            cancel,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// 已取消时返回错误
    pub fn ensure_active(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// 可取消的等待
    pub async fn pause(&self, duration: Duration) -> AppResult<()> {
        pacing::pause(&self.cancel, duration).await
    }

    /// 可取消的倒计时
    pub async fn countdown<F: FnMut(u64)>(&self, seconds: u64, on_tick: F) -> AppResult<()> {
        pacing::countdown(&self.cancel, seconds, on_tick).await
    }

    /// GET 请求，返回原始字节
    pub async fn get_bytes<Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
        referer: Option<&str>,
    ) -> AppResult<Vec<u8>> {
        let request = with_referer(self.client.get(url).query(query), referer);
        let response = self.send(request, url).await?;
        let bytes = response.bytes().await.map_err(|source| HttpError::Decode {
            endpoint: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// GET 请求，返回文本
    pub async fn get_text(&self, url: &str, referer: Option<&str>) -> AppResult<String> {
        let request = with_referer(self.client.get(url), referer);
        let response = self.send(request, url).await?;
        read_text(response, url).await
    }

    /// 表单 POST，返回文本
    pub async fn post_form_text<F: Serialize + ?Sized>(
        &self,
        url: &str,
        form: &F,
        referer: Option<&str>,
    ) -> AppResult<String> {
        let request = with_referer(self.client.post(url).form(form), referer);
        let response = self.send(request, url).await?;
        read_text(response, url).await
    }

    /// 表单 POST，返回 JSON
    pub async fn post_form_json<F, T>(&self, url: &str, form: &F, referer: Option<&str>) -> AppResult<T>
    where
        F: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = with_referer(self.client.post(url).form(form), referer);
        let response = self.send(request, url).await?;
        response.json::<T>().await.map_err(|source| {
            HttpError::Decode {
                endpoint: url.to_string(),
                source,
            }
            .into()
        })
    }

    /// 发送请求并检查状态码
    async fn send(&self, request: RequestBuilder, endpoint: &str) -> AppResult<Response> {
        self.ensure_active()?;
        debug!("请求: {}", endpoint);

        let response = tokio::select! {
            _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
            result = request.send() => result.map_err(|source| HttpError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?,
        };

        let status = response.status();
        debug!("响应: {} {}", status, endpoint);
        if !status.is_success() {
            return Err(HttpError::Status {
                endpoint: endpoint.to_string(),
                status,
            }
            .into());
        }
        Ok(response)
    }
}

fn with_referer(request: RequestBuilder, referer: Option<&str>) -> RequestBuilder {
    match referer {
        Some(referer) => request.header(REFERER, referer),
        None => request,
    }
}

async fn read_text(response: Response, endpoint: &str) -> AppResult<String> {
    response.text().await.map_err(|source| {
        HttpError::Decode {
            endpoint: endpoint.to_string(),
            source,
        }
        .into()
    })
}
