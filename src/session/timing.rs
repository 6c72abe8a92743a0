//! 停留时间计时器
//!
//! "进入时刻"只有这一个归属：每次切题由流程层重置，
//! 离开时通过 `Option::take` 消费，同一次进入至多产生一次记账，
//! 结构上排除重复离开导致的时间重复计算。

use std::time::Instant;

/// 当前题目的进入时刻
#[derive(Debug, Default)]
pub struct QuestionClock {
    entered: Option<(usize, Instant)>,
}

impl QuestionClock {
    /// 创建空计时器
    pub fn new() -> Self {
        Self { entered: None }
    }

    /// 进入某题，重置计时起点（覆盖上一次未结算的进入）
    pub fn enter(&mut self, index: usize, now: Instant) {
        self.entered = Some((index, now));
    }

    /// 离开当前题，结算一次停留时长
    ///
    /// # 返回
    /// `(题目索引, 非负的停留秒数)`；没有未结算的进入时返回 None
    pub fn leave(&mut self, now: Instant) -> Option<(usize, f64)> {
        let (index, entered_at) = self.entered.take()?;
        let elapsed = now.saturating_duration_since(entered_at).as_secs_f64();
        Some((index, elapsed))
    }

    /// 当前正在计时的题目索引
    pub fn tracking(&self) -> Option<usize> {
        self.entered.map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_leave_settles_elapsed_once() {
        let mut clock = QuestionClock::new();
        let t0 = Instant::now();

        clock.enter(2, t0);
        let (index, secs) = clock.leave(t0 + Duration::from_secs(40)).unwrap();
        assert_eq!(index, 2);
        assert!((secs - 40.0).abs() < 1e-9);

        // 没有新的进入，重复离开不产生第二次记账
        assert!(clock.leave(t0 + Duration::from_secs(50)).is_none());
    }

    #[test]
    fn test_enter_overwrites_pending_entry() {
        let mut clock = QuestionClock::new();
        let t0 = Instant::now();

        clock.enter(0, t0);
        clock.enter(1, t0 + Duration::from_secs(10));
        assert_eq!(clock.tracking(), Some(1));

        // 结算的是最近一次进入
        let (index, secs) = clock.leave(t0 + Duration::from_secs(15)).unwrap();
        assert_eq!(index, 1);
        assert!((secs - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_never_negative() {
        let mut clock = QuestionClock::new();
        let t0 = Instant::now();

        // 时钟回拨（离开时刻早于进入时刻）被钳为 0
        clock.enter(0, t0 + Duration::from_secs(10));
        let (_, secs) = clock.leave(t0).unwrap();
        assert_eq!(secs, 0.0);
    }
}
