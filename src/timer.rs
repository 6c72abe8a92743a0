//! 考试倒计时
//!
//! 状态机：Idle → Running(起点, 时长) → Expired。
//! 剩余时间永远由固定起点和固定时长推导，不依赖 tick 的累计，
//! 因此 tick 丢失或延迟不会拉长考试。到期转移恰好发生一次，
//! 之后的 tick 一律报告 Finished，不再触发任何回调。

use std::future::Future;
use std::time::{Duration, Instant};

/// 倒计时状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    /// 未启动
    Idle,
    /// 计时中
    Running {
        started_at: Instant,
        duration: Duration,
    },
    /// 已到期（终态）
    Expired,
}

/// 单次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 尚未启动
    Idle,
    /// 计时中，携带剩余时长
    Tick(Duration),
    /// 本次 tick 触发到期（整个生命周期恰好出现一次）
    Expired,
    /// 已到期后的多余 tick
    Finished,
}

/// 考试倒计时状态机
#[derive(Debug)]
pub struct CountdownTimer {
    state: CountdownState,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self {
            state: CountdownState::Idle,
        }
    }

    /// 启动倒计时（只在 Idle 状态生效，重复启动被忽略）
    pub fn start(&mut self, now: Instant, duration: Duration) {
        if self.state == CountdownState::Idle {
            self.state = CountdownState::Running {
                started_at: now,
                duration,
            };
        }
    }

    /// 处理一次 tick
    pub fn on_tick(&mut self, now: Instant) -> TickOutcome {
        match self.state {
            CountdownState::Idle => TickOutcome::Idle,
            CountdownState::Expired => TickOutcome::Finished,
            CountdownState::Running {
                started_at,
                duration,
            } => {
                let remaining = duration.saturating_sub(now.saturating_duration_since(started_at));
                if remaining.is_zero() {
                    self.state = CountdownState::Expired;
                    TickOutcome::Expired
                } else {
                    TickOutcome::Tick(remaining)
                }
            }
        }
    }

    /// 指定时刻的剩余时长（未启动时为 None，已到期为 0）
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        match self.state {
            CountdownState::Idle => None,
            CountdownState::Expired => Some(Duration::ZERO),
            CountdownState::Running {
                started_at,
                duration,
            } => Some(duration.saturating_sub(now.saturating_duration_since(started_at))),
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }
}

/// 驱动倒计时循环
///
/// 每秒 tick 一次；到期时先调用一次 `on_expired` 再返回，
/// 之后不会再有任何回调。调用方通过取消承载本函数的任务来提前终止。
pub async fn drive<T, E, Fut>(duration: Duration, mut on_tick: T, on_expired: E)
where
    T: FnMut(Duration),
    E: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut timer = CountdownTimer::new();
    timer.start(Instant::now(), duration);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        match timer.on_tick(Instant::now()) {
            TickOutcome::Tick(remaining) => on_tick(remaining),
            TickOutcome::Expired => {
                on_expired().await;
                return;
            }
            TickOutcome::Idle | TickOutcome::Finished => return,
        }
    }
}

/// 把秒数格式化为 HH:MM:SS
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
