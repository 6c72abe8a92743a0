//! 题目状态转移策略
//!
//! 纯函数：给定当前状态、当前是否已选择选项、触发的动作，计算下一个状态。
//! 导航方向（向前/向后/跳转）不影响结果。
//!
//! 标记具有"粘性"：被动导航从不悄悄降级一个已标记的题目，
//! 唯一的例外是"已答且标记"在答案被清掉之后离开时回落为"仅标记"，
//! 保留复查意图的同时如实反映答案缺失。

use crate::session::state::QuestionStatus;

/// 触发状态转移的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// 被动导航离开当前题（上一题/下一题/跳转/提交前结算）
    Navigate,
    /// 显式标记待复查
    MarkForReview,
    /// 显式清除作答
    ClearResponse,
}

/// 计算题目的下一个状态
pub fn next_status(
    current: QuestionStatus,
    has_answer: bool,
    action: NavAction,
) -> QuestionStatus {
    use QuestionStatus::*;

    match action {
        // 标记立即生效，是否带答案决定落点
        NavAction::MarkForReview => {
            if has_answer {
                AnsweredAndMarked
            } else {
                MarkedForReview
            }
        }

        // 清除作答后一律回到"未作答"（调用方同时负责清掉答案本身）
        NavAction::ClearResponse => NotAnswered,

        NavAction::Navigate => match (current, has_answer) {
            (NotVisited, true) | (NotAnswered, true) | (Answered, true) => Answered,
            (NotVisited, false) | (NotAnswered, false) | (Answered, false) => NotAnswered,
            // 答案被清掉后离开：回落为仅标记
            (AnsweredAndMarked, false) => MarkedForReview,
            (AnsweredAndMarked, true) => AnsweredAndMarked,
            // 标记保持粘性
            (MarkedForReview, _) => MarkedForReview,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QuestionStatus::*;

    #[test]
    fn test_navigate_reflects_answer_presence() {
        // 首次访问后离开：有无答案决定落点
        assert_eq!(next_status(NotVisited, true, NavAction::Navigate), Answered);
        assert_eq!(
            next_status(NotVisited, false, NavAction::Navigate),
            NotAnswered
        );
        // 未作答 → 补答后离开
        assert_eq!(next_status(NotAnswered, true, NavAction::Navigate), Answered);
        assert_eq!(
            next_status(NotAnswered, false, NavAction::Navigate),
            NotAnswered
        );
        // 已作答 → 答案被清掉后离开
        assert_eq!(
            next_status(Answered, false, NavAction::Navigate),
            NotAnswered
        );
        assert_eq!(next_status(Answered, true, NavAction::Navigate), Answered);
    }

    #[test]
    fn test_navigate_preserves_review_marks() {
        // 标记过的题目被动导航不降级
        assert_eq!(
            next_status(MarkedForReview, false, NavAction::Navigate),
            MarkedForReview
        );
        assert_eq!(
            next_status(MarkedForReview, true, NavAction::Navigate),
            MarkedForReview
        );
        assert_eq!(
            next_status(AnsweredAndMarked, true, NavAction::Navigate),
            AnsweredAndMarked
        );
    }

    #[test]
    fn test_navigate_downgrades_cleared_marked_answer() {
        // 唯一允许的降级：已答且标记、但答案已缺失 → 仅标记
        assert_eq!(
            next_status(AnsweredAndMarked, false, NavAction::Navigate),
            MarkedForReview
        );
    }

    #[test]
    fn test_mark_for_review_from_any_status() {
        for current in [
            NotVisited,
            NotAnswered,
            Answered,
            MarkedForReview,
            AnsweredAndMarked,
        ] {
            assert_eq!(
                next_status(current, true, NavAction::MarkForReview),
                AnsweredAndMarked
            );
            assert_eq!(
                next_status(current, false, NavAction::MarkForReview),
                MarkedForReview
            );
        }
    }

    #[test]
    fn test_clear_response_from_any_status() {
        for current in [
            NotVisited,
            NotAnswered,
            Answered,
            MarkedForReview,
            AnsweredAndMarked,
        ] {
            for has_answer in [true, false] {
                assert_eq!(
                    next_status(current, has_answer, NavAction::ClearResponse),
                    NotAnswered
                );
            }
        }
    }
}
