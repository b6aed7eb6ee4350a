//! 可取消的等待
//!
//! 登录重试间隔、提交前倒计时、问卷间暂停都走这里，取消令牌触发后立即返回
//! [`AppError::Cancelled`]。

use crate::error::{AppError, AppResult};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// 等待指定时长
pub async fn pause(cancel: &CancellationToken, duration: Duration) -> AppResult<()> {
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        _ = sleep(duration) => Ok(()),
    }
}

/// 按秒倒计时，每过一秒回调一次剩余秒数
pub async fn countdown<F>(cancel: &CancellationToken, seconds: u64, mut on_tick: F) -> AppResult<()>
where
    F: FnMut(u64),
{
    for elapsed in 1..=seconds {
        pause(cancel, Duration::from_secs(1)).await?;
        on_tick(seconds - elapsed);
    }
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pause_returns_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = pause(&cancel, Duration::from_secs(3600)).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_every_second() {
        let cancel = CancellationToken::new();
        let mut ticks = Vec::new();
        countdown(&cancel, 3, |remaining| ticks.push(remaining))
            .await
            .unwrap();
        assert_eq!(ticks, vec![2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_stops_when_cancelled() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut ticks = 0;
        let result = countdown(&cancel, 10, |_| {
            ticks += 1;
            if ticks == 2 {
                trigger.cancel();
            }
        })
        .await;
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert_eq!(ticks, 2);
    }

    #[tokio::test]
    async fn test_zero_countdown_is_immediate() {
        let cancel = CancellationToken::new();
        let mut called = false;
        countdown(&cancel, 0, |_| called = true).await.unwrap();
        assert!(!called);
    }
}
