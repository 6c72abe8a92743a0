//! # Exam Session
//!
//! 在线考试客户端核心：按顺序呈现选择题、跟踪每题的作答/访问/标记状态、
//! 统计每题停留时间、执行倒计时并在到期或用户确认后提交答卷评分
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 会话层（Session）
//! - `session/` - 考试会话状态机，唯一持有会话状态
//! - `ExamSession` - 状态仓库（题目、答案、状态、计时、生命周期标志）
//! - `next_status` - 纯函数状态转移策略
//! - `QuestionClock` - 单一归属的停留计时器，保证至多记账一次
//!
//! ### ② 能力层（Clients）
//! - `clients/` - 描述"我能调用什么"，封装外部考试服务
//! - `ExamClient` - 拉取试卷 / 提交答卷 / 查询成绩
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次考试"的完整动作编排
//! - `ExamFlow` - 导航顺序约定（状态 → 计时 → 切题）、单飞提交、到期强制提交
//!
//! ### ④ 应用层（App）
//! - `app` - 命令行交互循环，只做胶水
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod submission;
pub mod timer;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::ExamClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ExamPaper, ExamResult, Question, QuestionId, SubmitRequest, SubmitResponse};
pub use session::{ExamSession, NavAction, QuestionStatus, SessionError, SessionStats};
pub use timer::{CountdownTimer, TickOutcome};
pub use workflow::{ExamFlow, SubmitOutcome};
