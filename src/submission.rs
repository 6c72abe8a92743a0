//! 提交载荷构建
//!
//! 把仓库内部的映射（按题目索引建键的停留时间）转换为外部载荷形状
//! （按题目标识建键），并保证：未作答的题目缺席于 answers、
//! total_time 为全部停留时间的非负之和、user_id 每次调用全新生成。

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::SubmitRequest;
use crate::session::ExamSession;

/// 生成一次性用户标识
///
/// 进程内任意两次调用不会碰撞，不跨提交复用
pub fn generate_user_id() -> String {
    format!("user_{}", Uuid::new_v4().simple())
}

/// 从会话构建提交载荷
pub fn build_payload(session: &ExamSession) -> SubmitRequest {
    // 答案本就按题目标识建键，未作答即缺席
    let answers = session.answers().clone();

    // 停留时间从索引键重映射为标识键；找不到对应题目的索引丢弃
    let mut time_spent = HashMap::new();
    for (&index, &secs) in session.time_spent() {
        if let Some(question) = session.question(index) {
            time_spent.insert(question.id, secs.max(0.0));
        }
    }

    let total_time: f64 = session
        .time_spent()
        .values()
        .map(|secs| secs.max(0.0))
        .sum();

    SubmitRequest {
        user_id: generate_user_id(),
        answers,
        time_spent,
        total_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, QuestionId};

    fn make_questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| Question {
                id: QuestionId(200 + i as i64),
                text: format!("第 {} 题", i + 1),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            })
            .collect()
    }

    #[test]
    fn test_payload_omits_absent_answers() {
        let mut session = ExamSession::new();
        session.load_questions("1", make_questions(3));
        session.start();
        session.set_answer(1, Some(3)).unwrap();

        let payload = build_payload(&session);
        assert_eq!(payload.answers.len(), 1);
        assert_eq!(payload.answers.get(&QuestionId(201)), Some(&3));
        // 未作答的题目缺席，而不是 0
        assert!(!payload.answers.contains_key(&QuestionId(200)));
        assert!(!payload.answers.contains_key(&QuestionId(202)));
    }

    #[test]
    fn test_time_spent_remapped_to_question_ids() {
        let mut session = ExamSession::new();
        session.load_questions("1", make_questions(2));
        session.start();
        session.add_elapsed(0, 12.0).unwrap();
        session.add_elapsed(1, 8.0).unwrap();
        session.add_elapsed(0, 3.0).unwrap();

        let payload = build_payload(&session);
        assert_eq!(payload.time_spent.get(&QuestionId(200)), Some(&15.0));
        assert_eq!(payload.time_spent.get(&QuestionId(201)), Some(&8.0));
        assert!((payload.total_time - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_scenario_five_questions() {
        // 加载 5 题，第 1 题选第 2 个选项，第 3 题只标记不作答，
        // 全部浏览一遍，第 1 题停留 40 秒、第 3 题停留 10 秒
        let mut session = ExamSession::new();
        session.load_questions("7", make_questions(5));
        session.start();

        for index in 0..5 {
            session.select_question(index).unwrap();
        }
        session.set_answer(0, Some(2)).unwrap();
        session
            .set_status(2, crate::session::QuestionStatus::MarkedForReview)
            .unwrap();

        session.add_elapsed(0, 40.0).unwrap();
        session.add_elapsed(2, 10.0).unwrap();
        for index in [1, 3, 4] {
            session.add_elapsed(index, 1.0).unwrap();
        }

        let payload = build_payload(&session);

        assert_eq!(payload.answers.len(), 1);
        assert_eq!(payload.answers.get(&QuestionId(200)), Some(&2));
        assert_eq!(payload.time_spent.len(), 5);
        assert_eq!(payload.time_spent.get(&QuestionId(200)), Some(&40.0));
        assert_eq!(payload.time_spent.get(&QuestionId(202)), Some(&10.0));
        assert!((payload.total_time - 53.0).abs() < 1e-9);
    }

    #[test]
    fn test_user_ids_are_unique_per_call() {
        let mut session = ExamSession::new();
        session.load_questions("1", make_questions(1));
        session.start();

        let first = build_payload(&session);
        let second = build_payload(&session);
        assert!(first.user_id.starts_with("user_"));
        assert_ne!(first.user_id, second.user_id);
    }

    #[test]
    fn test_payload_serializes_with_integer_keys() {
        let mut session = ExamSession::new();
        session.load_questions("1", make_questions(2));
        session.start();
        session.set_answer(0, Some(1)).unwrap();
        session.add_elapsed(0, 2.5).unwrap();

        let json = serde_json::to_value(build_payload(&session)).unwrap();
        assert_eq!(json["answers"]["200"], 1);
        assert_eq!(json["time_spent"]["200"], 2.5);
    }
}
