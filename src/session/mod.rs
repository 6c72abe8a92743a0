//! 考试会话状态机 - 会话层
//!
//! 核心职责：持有一次考试的全部内存状态，并保证以下不变量：
//! - 题目加载后 `0 <= current_index < questions.len()`
//! - 每个题目索引任意时刻恰有一个状态，各状态计数之和恒等于题目总数
//! - 停留时间只在会话活跃期间单调递增，且每次离开至多记账一次
//! - 提交后的冻结由流程层负责，仓库本身不重复校验

pub mod state;
pub mod timing;
pub mod transition;

use thiserror::Error;

pub use state::{ExamSession, QuestionStatus, SessionStats};
pub use timing::QuestionClock;
pub use transition::{next_status, NavAction};

/// 会话状态机的领域错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 试卷尚未加载
    #[error("试卷尚未加载")]
    NotLoaded,

    /// 题目索引越界
    #[error("题目索引 {index} 超出范围 [0, {max})")]
    IndexOutOfRange { index: usize, max: usize },

    /// 选项索引越界
    #[error("选项索引 {option} 超出范围 [0, {max})")]
    OptionOutOfRange { option: u32, max: usize },

    /// 试卷已提交，禁止继续修改
    #[error("试卷已提交，禁止继续修改")]
    AlreadySubmitted,
}
