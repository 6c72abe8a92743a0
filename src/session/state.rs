//! 会话状态仓库
//!
//! 持有考试标识、题目列表、逐题答案/状态/停留时间与生命周期标志。
//! 所有变更都是同步的单步更新，不存在延迟或异步写入；
//! 除"首次访问自动置为未作答"外，仓库不隐式改动任何状态，
//! 其余状态变更全部由调用方显式触发。

use std::collections::HashMap;
use std::time::Instant;

use crate::models::{Question, QuestionId};
use crate::session::SessionError;

/// 题目状态
///
/// 每个题目索引任意时刻恰有一个状态，默认"未访问"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionStatus {
    /// 未访问
    NotVisited,
    /// 已访问但未作答
    NotAnswered,
    /// 已作答
    Answered,
    /// 标记待复查（未作答）
    MarkedForReview,
    /// 已作答且标记待复查
    AnsweredAndMarked,
}

impl std::fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            QuestionStatus::NotVisited => "未访问",
            QuestionStatus::NotAnswered => "未作答",
            QuestionStatus::Answered => "已作答",
            QuestionStatus::MarkedForReview => "标记复查",
            QuestionStatus::AnsweredAndMarked => "已答并标记",
        };
        write!(f, "{}", label)
    }
}

/// 各状态的题目计数
///
/// 不变量：五项计数之和恒等于 total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    pub not_visited: usize,
    pub not_answered: usize,
    pub answered: usize,
    pub marked_for_review: usize,
    pub answered_and_marked: usize,
}

impl SessionStats {
    /// 五项计数之和（应恒等于 total）
    pub fn sum(&self) -> usize {
        self.not_visited
            + self.not_answered
            + self.answered
            + self.marked_for_review
            + self.answered_and_marked
    }
}

/// 一名用户对一张试卷的一次作答会话
#[derive(Debug, Clone)]
pub struct ExamSession {
    exam_id: Option<String>,
    questions: Vec<Question>,
    current_index: usize,
    /// 按题目标识（而非位置）建键，题目重排时答案仍然有效
    answers: HashMap<QuestionId, u32>,
    statuses: Vec<QuestionStatus>,
    /// 按题目索引建键的累计停留秒数，只在离开该题时更新
    time_spent: HashMap<usize, f64>,
    started_at: Option<Instant>,
    submitted: bool,
}

impl Default for ExamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExamSession {
    /// 创建空会话
    pub fn new() -> Self {
        Self {
            exam_id: None,
            questions: Vec::new(),
            current_index: 0,
            answers: HashMap::new(),
            statuses: Vec::new(),
            time_spent: HashMap::new(),
            started_at: None,
            submitted: false,
        }
    }

    // ========== 生命周期 ==========

    /// 加载试卷题目
    ///
    /// 同一张试卷重复加载是幂等的空操作（防止路由抖动导致的二次加载）。
    /// 加载会把所有状态重置为"未访问"，但不清空已有答案。
    ///
    /// # 返回
    /// 是否真正执行了加载
    pub fn load_questions(&mut self, exam_id: &str, questions: Vec<Question>) -> bool {
        if self.exam_id.as_deref() == Some(exam_id) && !self.questions.is_empty() {
            return false;
        }

        self.statuses = vec![QuestionStatus::NotVisited; questions.len()];
        self.questions = questions;
        self.exam_id = Some(exam_id.to_string());
        self.current_index = 0;
        true
    }

    /// 开始考试（只在首次调用时生效）
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// 标记会话已提交（提交后的冻结由流程层负责）
    pub fn submit(&mut self) {
        self.submitted = true;
    }

    /// 会话是否活跃（已开始且未提交）
    pub fn is_active(&self) -> bool {
        self.started_at.is_some() && !self.submitted
    }

    /// 重置为空会话
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ========== 变更操作 ==========

    /// 切换当前题目
    ///
    /// 仓库唯一的隐式状态变更：首次访问的题目自动从"未访问"
    /// 置为"未作答"，且只发生一次
    pub fn select_question(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_index(index)?;

        if self.statuses[index] == QuestionStatus::NotVisited {
            self.statuses[index] = QuestionStatus::NotAnswered;
        }
        self.current_index = index;
        Ok(())
    }

    /// 记录或清除某题的作答
    ///
    /// 只维护答案映射，不改动题目状态（状态由转移策略显式决定）
    pub fn set_answer(&mut self, index: usize, answer: Option<u32>) -> Result<(), SessionError> {
        self.check_index(index)?;
        let question = &self.questions[index];

        match answer {
            Some(option) => {
                if option as usize >= question.options.len() {
                    return Err(SessionError::OptionOutOfRange {
                        option,
                        max: question.options.len(),
                    });
                }
                self.answers.insert(question.id, option);
            }
            None => {
                self.answers.remove(&question.id);
            }
        }
        Ok(())
    }

    /// 显式设置某题的状态
    pub fn set_status(&mut self, index: usize, status: QuestionStatus) -> Result<(), SessionError> {
        self.check_index(index)?;
        self.statuses[index] = status;
        Ok(())
    }

    /// 累加某题的停留时间
    ///
    /// 只在会话活跃期间生效；非正的时长被忽略，保证每个键单调不减
    pub fn add_elapsed(&mut self, index: usize, secs: f64) -> Result<(), SessionError> {
        self.check_index(index)?;

        if !self.is_active() || secs <= 0.0 {
            return Ok(());
        }
        *self.time_spent.entry(index).or_insert(0.0) += secs;
        Ok(())
    }

    // ========== 读取访问器 ==========

    /// 当前题目
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// 指定索引的题目
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// 指定索引的状态（越界视为未访问）
    pub fn status_of(&self, index: usize) -> QuestionStatus {
        self.statuses
            .get(index)
            .copied()
            .unwrap_or(QuestionStatus::NotVisited)
    }

    /// 指定索引题目的已选选项
    pub fn answer_of(&self, index: usize) -> Option<u32> {
        let question = self.questions.get(index)?;
        self.answers.get(&question.id).copied()
    }

    /// 指定索引题目的累计停留秒数
    pub fn time_spent_on(&self, index: usize) -> f64 {
        self.time_spent.get(&index).copied().unwrap_or(0.0)
    }

    /// 统计各状态的题目数量
    pub fn stats(&self) -> SessionStats {
        let mut stats = SessionStats {
            total: self.questions.len(),
            ..Default::default()
        };
        for status in &self.statuses {
            match status {
                QuestionStatus::NotVisited => stats.not_visited += 1,
                QuestionStatus::NotAnswered => stats.not_answered += 1,
                QuestionStatus::Answered => stats.answered += 1,
                QuestionStatus::MarkedForReview => stats.marked_for_review += 1,
                QuestionStatus::AnsweredAndMarked => stats.answered_and_marked += 1,
            }
        }
        stats
    }

    pub fn exam_id(&self) -> Option<&str> {
        self.exam_id.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &HashMap<QuestionId, u32> {
        &self.answers
    }

    pub fn time_spent(&self) -> &HashMap<usize, f64> {
        &self.time_spent
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    // ========== 内部辅助 ==========

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if self.questions.is_empty() {
            return Err(SessionError::NotLoaded);
        }
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                max: self.questions.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 创建测试用的题目列表
    fn make_questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| Question {
                id: QuestionId(100 + i as i64),
                text: format!("第 {} 题", i + 1),
                options: vec![
                    "选项A".to_string(),
                    "选项B".to_string(),
                    "选项C".to_string(),
                    "选项D".to_string(),
                ],
            })
            .collect()
    }

    fn loaded_session(count: usize) -> ExamSession {
        let mut session = ExamSession::new();
        assert!(session.load_questions("1", make_questions(count)));
        session.start();
        session
    }

    #[test]
    fn test_load_is_idempotent_for_same_exam() {
        let mut session = loaded_session(3);
        session.set_answer(0, Some(2)).unwrap();
        session.select_question(1).unwrap();

        // 同一张试卷重复加载：空操作，答案与状态原样保留
        assert!(!session.load_questions("1", make_questions(3)));
        assert_eq!(session.answer_of(0), Some(2));
        assert_eq!(session.current_index(), 1);

        // 换一张试卷：状态重置，但答案按标识保留
        assert!(session.load_questions("2", make_questions(5)));
        assert_eq!(session.stats().not_visited, 5);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_first_visit_flips_exactly_once() {
        let mut session = loaded_session(3);

        assert_eq!(session.status_of(1), QuestionStatus::NotVisited);
        session.select_question(1).unwrap();
        assert_eq!(session.status_of(1), QuestionStatus::NotAnswered);

        // 手动置为已作答后再次访问，不得被重置
        session.set_status(1, QuestionStatus::Answered).unwrap();
        session.select_question(0).unwrap();
        session.select_question(1).unwrap();
        assert_eq!(session.status_of(1), QuestionStatus::Answered);
    }

    #[test]
    fn test_stats_counts_always_sum_to_total() {
        let mut session = loaded_session(5);

        // 任意导航序列下计数守恒
        for index in [0, 3, 1, 3, 4, 2, 0, 4] {
            session.select_question(index).unwrap();
            let stats = session.stats();
            assert_eq!(stats.sum(), stats.total);
            assert_eq!(stats.total, 5);
        }

        session
            .set_status(2, QuestionStatus::MarkedForReview)
            .unwrap();
        session
            .set_status(4, QuestionStatus::AnsweredAndMarked)
            .unwrap();
        let stats = session.stats();
        assert_eq!(stats.sum(), stats.total);
        assert_eq!(stats.marked_for_review, 1);
        assert_eq!(stats.answered_and_marked, 1);
    }

    #[test]
    fn test_answers_are_keyed_by_question_id() {
        let mut session = loaded_session(3);

        session.set_answer(0, Some(2)).unwrap();
        assert_eq!(session.answers().get(&QuestionId(100)), Some(&2));
        assert_eq!(session.answer_of(0), Some(2));

        // 清除作答：键消失，而不是置 0
        session.set_answer(0, None).unwrap();
        assert!(session.answers().is_empty());
        assert_eq!(session.answer_of(0), None);
    }

    #[test]
    fn test_set_answer_rejects_out_of_range_option() {
        let mut session = loaded_session(2);
        assert_eq!(
            session.set_answer(0, Some(4)),
            Err(SessionError::OptionOutOfRange { option: 4, max: 4 })
        );
    }

    #[test]
    fn test_add_elapsed_is_additive_and_non_negative() {
        let mut session = loaded_session(2);

        session.add_elapsed(0, 12.5).unwrap();
        session.add_elapsed(0, 7.5).unwrap();
        // 非正时长被忽略
        session.add_elapsed(0, 0.0).unwrap();
        session.add_elapsed(0, -3.0).unwrap();
        assert_eq!(session.time_spent_on(0), 20.0);

        // 提交后不再累计
        session.submit();
        session.add_elapsed(0, 9.0).unwrap();
        assert_eq!(session.time_spent_on(0), 20.0);
    }

    #[test]
    fn test_add_elapsed_requires_started_session() {
        let mut session = ExamSession::new();
        session.load_questions("1", make_questions(1));

        // 未开始的会话不累计时间
        session.add_elapsed(0, 5.0).unwrap();
        assert_eq!(session.time_spent_on(0), 0.0);
    }

    #[test]
    fn test_mutation_before_load_is_rejected() {
        let mut session = ExamSession::new();
        assert_eq!(session.select_question(0), Err(SessionError::NotLoaded));
        assert_eq!(session.set_answer(0, Some(1)), Err(SessionError::NotLoaded));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut session = loaded_session(3);
        assert_eq!(
            session.select_question(3),
            Err(SessionError::IndexOutOfRange { index: 3, max: 3 })
        );
    }

    #[test]
    fn test_reset_returns_to_empty() {
        let mut session = loaded_session(3);
        session.set_answer(0, Some(1)).unwrap();
        session.reset();
        assert!(session.is_empty());
        assert!(session.exam_id().is_none());
        assert!(!session.is_active());
    }
}
